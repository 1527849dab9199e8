use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::clients::GroqConfig;
use crate::error::ConfigError;

/// Trait for types that can retrieve their configuration key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key by checking environment variables first, then .env file
    fn find_key() -> Option<String> {
        // First try to load .env file (silently fail if not found)
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    fn require_key() -> Result<String, ConfigError> {
        Self::find_key().ok_or(ConfigError::MissingKey(Self::KEY_NAME))
    }
}

/// Non-empty value of `name`, if set.
fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

pub(crate) fn env_or(name: &str, default: String) -> String {
    env_value(name).unwrap_or(default)
}

/// Parse `name` from the environment; unset or blank falls back to `default`.
pub(crate) fn env_parse<T: FromStr>(name: &'static str, default: T, expected: &'static str) -> Result<T, ConfigError> {
    parse_setting(name, env_value(name), default, expected)
}

fn parse_setting<T: FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw.filter(|value| !value.trim().is_empty()) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name,
            value,
            expected,
        }),
        None => Ok(default),
    }
}

/// Everything the quiz needs from the process environment.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub groq: GroqConfig,
    /// Directory saved results go to (`QUIZ_RESULTS_DIR`, default `results`).
    pub results_dir: PathBuf,
}

impl QuizConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let groq = GroqConfig::from_env()?;
        let results_dir = PathBuf::from(env_or("QUIZ_RESULTS_DIR", "results".to_string()));
        Ok(Self { groq, results_dir })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_settings_use_the_default() {
        assert_eq!(parse_setting("GROQ_TEMPERATURE", None, 0.9_f32, "a number").unwrap(), 0.9);
        assert_eq!(parse_setting("GROQ_TEMPERATURE", Some("  ".into()), 0.9_f32, "a number").unwrap(), 0.9);
        assert!(!parse_setting("GROQ_JSON_MODE", Some(String::new()), false, "true or false").unwrap());
    }

    #[test]
    fn settings_are_parsed_after_trimming() {
        assert_eq!(parse_setting("GROQ_TEMPERATURE", Some(" 0.2 ".into()), 0.9_f32, "a number").unwrap(), 0.2);
        assert!(parse_setting("GROQ_JSON_MODE", Some("true".into()), false, "true or false").unwrap());
    }

    #[test]
    fn malformed_setting_names_the_variable() {
        let err = parse_setting("GROQ_TEMPERATURE", Some("warm".into()), 0.9_f32, "a number").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name: "GROQ_TEMPERATURE", ref value, .. } if value == "warm"
        ));
    }
}
