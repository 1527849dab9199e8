//! Question generation: prompt the model, parse its reply, validate, retry.
//!
//! Every kind follows the same loop. An attempt fails on an upstream error,
//! on a reply that does not parse into the kind's draft shape, or on a draft
//! that breaks the kind's rules. Failed attempts are retried immediately with
//! the same prompt until the budget in [`RetryConfig`] is spent, at which
//! point the last failure is returned inside [`GenerationExhausted`].

use schemars::schema_for;
use tracing::{debug, error, info, instrument, warn};

use crate::core::{LowLevelClient, RetryConfig};
use crate::error::{AttemptError, GenerationExhausted};
use crate::json_utils::extract_first;
use crate::question::{
    BlankDraft, BlankQuestion, BooleanDraft, BooleanQuestion, ChoiceDraft, ChoiceQuestion, Difficulty,
    Question, QuestionDraft, QuestionKind,
};

/// Instruction prompt for one question of `kind`.
pub fn build_prompt(kind: QuestionKind, topic: &str, difficulty: Difficulty) -> String {
    match kind {
        QuestionKind::Choice => format!(
            "Generate a {difficulty} multiple-choice question about {topic}.\n\n\
             Return ONLY a JSON object with these exact fields:\n\
             - 'question': A clear, specific question\n\
             - 'options': An array of exactly 4 possible answers\n\
             - 'correct_answer': One of the options that is the correct answer\n\n\
             Example format:\n\
             {{\n    \"question\": \"What is the capital of France?\",\n    \
             \"options\": [\"London\", \"Berlin\", \"Paris\", \"Madrid\"],\n    \
             \"correct_answer\": \"Paris\"\n}}\n\n\
             Your response:"
        ),
        QuestionKind::Blank => format!(
            "Generate a {difficulty} fill-in-the-blank question about {topic}.\n\n\
             Return ONLY a JSON object with these exact fields:\n\
             - 'question': A sentence with '_____' marking where the blank should be\n\
             - 'answer': The correct word or phrase that belongs in the blank\n\n\
             Example format:\n\
             {{\n    \"question\": \"The capital of France is _____.\",\n    \
             \"answer\": \"Paris\"\n}}\n\n\
             Your response:"
        ),
        QuestionKind::Boolean => format!(
            "Generate a {difficulty} true/false question about {topic}.\n\n\
             Return ONLY a JSON object with these exact fields:\n\
             - 'question': A statement that can be answered with True or False\n\
             - 'correct_answer': 'True' or 'False'\n\n\
             Example format:\n\
             {{\n    \"question\": \"The Earth is flat.\",\n    \
             \"correct_answer\": \"False\"\n}}\n\n\
             Your response:"
        ),
    }
}

/// Append the JSON schema of `D` as the response format description.
fn add_schema_guidance<D: QuestionDraft>(prompt: String) -> String {
    let schema = schema_for!(D);
    let schema_json =
        serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "Schema serialization failed".to_string());

    format!(
        "{}\n\n## Response Format\nThe JSON object must match this schema:\n```json\n{}\n```",
        prompt, schema_json
    )
}

/// Parse a raw reply: the whole text first, then any JSON embedded in it.
pub fn parse_response<D: QuestionDraft>(raw: &str) -> Result<D, AttemptError> {
    match serde_json::from_str::<D>(raw.trim()) {
        Ok(draft) => Ok(draft),
        Err(err) => extract_first::<D>(raw).ok_or_else(|| AttemptError::Parse(err, raw.to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct QuestionGenerator<C: LowLevelClient> {
    client: C,
    config: RetryConfig,
}

impl<C: LowLevelClient> QuestionGenerator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            config: RetryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub async fn generate_choice(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<ChoiceQuestion, GenerationExhausted> {
        self.generate_draft::<ChoiceDraft>(topic, difficulty).await
    }

    pub async fn generate_blank(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<BlankQuestion, GenerationExhausted> {
        self.generate_draft::<BlankDraft>(topic, difficulty).await
    }

    pub async fn generate_boolean(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<BooleanQuestion, GenerationExhausted> {
        self.generate_draft::<BooleanDraft>(topic, difficulty).await
    }

    /// Generate one question of `kind` in the common representation.
    pub async fn generate(
        &self,
        kind: QuestionKind,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<Question, GenerationExhausted> {
        Ok(match kind {
            QuestionKind::Choice => self.generate_choice(topic, difficulty).await?.into(),
            QuestionKind::Blank => self.generate_blank(topic, difficulty).await?.into(),
            QuestionKind::Boolean => self.generate_boolean(topic, difficulty).await?.into(),
        })
    }

    #[instrument(target = "quiz_forge::generator", skip(self), fields(kind = %D::KIND))]
    async fn generate_draft<D: QuestionDraft>(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<D::Output, GenerationExhausted> {
        let prompt = add_schema_guidance::<D>(build_prompt(D::KIND, topic, difficulty));
        let attempts = self.config.attempts();

        let mut attempt = 1;
        loop {
            debug!(attempt, attempts, "Requesting question");
            match self.attempt::<D>(prompt.clone()).await {
                Ok(question) => {
                    info!(attempt, "Generated valid question");
                    return Ok(question);
                }
                Err(last) if attempt >= attempts => {
                    error!(error = %last, attempts, "Retry budget exhausted");
                    return Err(GenerationExhausted {
                        kind: D::KIND,
                        attempts,
                        last,
                    });
                }
                Err(err) => {
                    warn!(error = %err, attempt, "Attempt failed, retrying");
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt<D: QuestionDraft>(&self, prompt: String) -> Result<D::Output, AttemptError> {
        let raw = self.client.ask_raw(prompt).await?;
        let draft = parse_response::<D>(&raw)?;
        Ok(draft.validate()?)
    }
}
