pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod generator;
pub mod json_utils;
pub mod question;
pub mod session;

// Convenient re-exports
pub use crate::core::{LowLevelClient, RetryConfig};
pub use error::{GenerationExhausted, QuizError};
pub use export::{ExportTarget, QuizResult, ResultTable};
pub use generator::QuestionGenerator;
pub use question::{Difficulty, Question, QuestionKind};
pub use session::{QuizSession, Score, SessionState};
