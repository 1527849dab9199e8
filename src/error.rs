use std::path::PathBuf;

use thiserror::Error;

use crate::question::QuestionKind;

/// Failure of the language-model call itself.
#[derive(Error, Debug)]
pub enum AIError {
    #[error("Groq API error: {0}")]
    Groq(#[from] GroqError),
    #[error("Mock client error: {0}")]
    Mock(String),
}

#[derive(Error, Debug)]
pub enum GroqError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

/// A parsed question that breaks one of its kind's rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("question text is empty")]
    EmptyQuestion,
    #[error("answer is empty")]
    EmptyAnswer,
    #[error("expected exactly 4 options, got {0}")]
    OptionCount(usize),
    #[error("options are not unique")]
    DuplicateOptions,
    #[error("correct answer '{0}' is not one of the options")]
    AnswerNotInOptions(String),
    #[error("question missing blank marker '_____'")]
    MissingBlankMarker,
    #[error("correct answer must be 'True' or 'False', got '{0}'")]
    InvalidBooleanLiteral(String),
}

/// One failed generation attempt. Retried inside the generator, never returned on its own.
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error("upstream call failed: {0}")]
    Upstream(#[from] AIError),
    #[error("could not parse model response: {0}. Raw response: {1}")]
    Parse(#[source] serde_json::Error, String),
    #[error("invalid question: {0}")]
    Validation(#[from] ValidationError),
}

/// Terminal failure once the retry budget is spent.
#[derive(Error, Debug)]
#[error("Failed to generate valid {kind} question after {attempts} attempts: {last}")]
pub struct GenerationExhausted {
    pub kind: QuestionKind,
    pub attempts: usize,
    #[source]
    pub last: AttemptError,
}

#[derive(Error, Debug)]
pub enum QuizError {
    #[error(transparent)]
    Generation(#[from] GenerationExhausted),
    #[error("no questions have been generated")]
    NotGenerated,
    #[error("answer index {index} out of range for {total} questions")]
    AnswerIndexOutOfRange { index: usize, total: usize },
    #[error("answers must be recorded in order: expected index {expected}, got {index}")]
    AnswerOutOfOrder { index: usize, expected: usize },
    #[error("only {answered} of {total} questions have been answered")]
    IncompleteAnswers { answered: usize, total: usize },
    #[error("No results to save. Please complete the quiz first.")]
    NoResults,
    #[error("failed to render results: {0}")]
    Export(#[from] csv::Error),
    #[error("failed to save results to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingKey(&'static str),
    #[error("environment variable {name} has invalid value '{value}': expected {expected}")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}
