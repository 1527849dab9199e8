//! The language-model seam and the retry budget shared by every question kind.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::AIError;

/// Number of attempts the generator makes per question before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Low-level model client abstraction.
///
/// Implementors provide `ask_raw`, which executes a prompt and returns the raw
/// model text. Parsing and validation are performed by `QuestionGenerator`.
#[async_trait]
pub trait LowLevelClient: Send + Sync + Debug {
    /// The only method that implementations must provide
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError>;

    /// Clone this client into a boxed trait object
    fn clone_box(&self) -> Box<dyn LowLevelClient>;
}

impl Clone for Box<dyn LowLevelClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl LowLevelClient for Box<dyn LowLevelClient> {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.as_ref().ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        self.as_ref().clone_box()
    }
}

/// Attempt budget for a single question. There is no backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryConfig {
    /// Attempts actually made; a zero budget still makes one call.
    pub fn attempts(&self) -> usize {
        self.max_attempts.max(1)
    }
}
