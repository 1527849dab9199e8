use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{core::LowLevelClient, error::AIError};

/// Mock client for testing that returns empty responses
#[derive(Debug, Clone, Default)]
pub struct MockVoid;

#[async_trait]
impl LowLevelClient for MockVoid {
    async fn ask_raw(&self, _prompt: String) -> Result<String, AIError> {
        Ok("{}".to_string())
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Failure(String),
}

/// Shared control surface for a [`MockClient`]: queue replies, inspect calls.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockHandle {
    pub fn add_response(&self, response: MockResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        for response in responses {
            self.add_response(response);
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn next(&self, prompt: String) -> Option<MockResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt);
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }
}

/// Client that replays queued responses in order. An empty queue is an upstream failure.
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (Self { handle: handle.clone() }, handle)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        handle.add_responses(responses);
        (client, handle)
    }
}

#[async_trait]
impl LowLevelClient for MockClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        match self.handle.next(prompt) {
            Some(MockResponse::Success(text)) => Ok(text),
            Some(MockResponse::Failure(message)) => Err(AIError::Mock(message)),
            None => Err(AIError::Mock("no more mock responses".to_string())),
        }
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
