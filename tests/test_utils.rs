#![allow(dead_code)]

use std::sync::Arc;

use quiz_forge::clients::{MockClient, MockHandle, MockResponse};
use quiz_forge::QuestionGenerator;

pub const FRANCE_CHOICE: &str = r#"{"question":"What is the capital of France?","options":["London","Berlin","Paris","Madrid"],"correct_answer":"Paris"}"#;
pub const FRANCE_BLANK: &str = r#"{"question":"The capital of France is ___.","answer":"Paris"}"#;
pub const FLAT_EARTH: &str = r#"{"question":"The Earth is flat.","correct_answer":"False"}"#;

/// Three options only: parses, but fails validation.
pub const SHORT_CHOICE: &str = r#"{"question":"Pick one","options":["a","b","c"],"correct_answer":"a"}"#;

pub fn ok(text: &str) -> MockResponse {
    MockResponse::Success(text.to_string())
}

pub fn repeat(response: MockResponse, n: usize) -> Vec<MockResponse> {
    std::iter::repeat(response).take(n).collect()
}

/// Generator backed by a mock that replays `responses` in order.
pub fn mock_generator(responses: Vec<MockResponse>) -> (QuestionGenerator<MockClient>, Arc<MockHandle>) {
    let (client, handle) = MockClient::with_responses(responses);
    (QuestionGenerator::new(client), handle)
}
