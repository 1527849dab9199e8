use crate::config::{env_or, env_parse, KeyFromEnv};
use crate::core::LowLevelClient;
use crate::error::{AIError, ConfigError, GroqError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Debug, Serialize)]
struct GroqRequest {
    model: String,
    messages: Vec<GroqMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct GroqMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqResponseMessage,
}

#[derive(Debug, Deserialize)]
struct GroqResponseMessage {
    content: String,
}

/// Configuration for Groq client
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Ask the API to constrain output to a single JSON object.
    pub json_mode: bool,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 1024,
            temperature: 0.9,
            json_mode: false,
        }
    }
}

impl KeyFromEnv for GroqConfig {
    const KEY_NAME: &'static str = "GROQ_API_KEY";
}

impl GroqConfig {
    /// Read `GROQ_API_KEY` (required), `GROQ_MODEL`, `GROQ_TEMPERATURE` and
    /// `GROQ_JSON_MODE`. Blank optional values fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            api_key: Self::require_key()?,
            temperature: env_parse("GROQ_TEMPERATURE", default.temperature, "a floating point number")?,
            json_mode: env_parse("GROQ_JSON_MODE", default.json_mode, "true or false")?,
            model: env_or("GROQ_MODEL", default.model),
            ..default
        })
    }
}

#[derive(Debug, Clone)]
pub struct GroqClient {
    config: GroqConfig,
    client: Client,
}

impl GroqClient {
    pub fn new(config: GroqConfig) -> Self {
        info!(model = %config.model, temperature = config.temperature, "Creating new Groq client");
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &GroqConfig {
        &self.config
    }

    fn request(&self, prompt: String) -> GroqRequest {
        GroqRequest {
            model: self.config.model.clone(),
            messages: vec![GroqMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: self.config.json_mode.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

#[async_trait]
impl LowLevelClient for GroqClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let request = self.request(prompt);

        debug!("Sending request to Groq API");
        let response = self
            .client
            .post(GROQ_CHAT_URL)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                GroqError::Http(e.to_string())
            })?;

        debug!(status = %response.status(), "Received response from Groq API");

        if response.status() == 429 {
            warn!("Groq API rate limit exceeded");
            return Err(GroqError::RateLimit.into());
        }

        if response.status() == 401 {
            error!("Groq API authentication failed");
            return Err(GroqError::Authentication.into());
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Groq API error");
            return Err(GroqError::Api(error_text).into());
        }

        let groq_response: GroqResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Groq response JSON");
            GroqError::Http(e.to_string())
        })?;

        let content = groq_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GroqError::Api("No choices in response".to_string()))?;

        info!(response_len = content.len(), "Successfully received Groq response");
        Ok(content)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
