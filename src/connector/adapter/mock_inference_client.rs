use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::application::InferenceClient;
use crate::domain::{DomainError, GenerationRequest};

/// Inference client with scripted replies, for tests and offline runs.
///
/// Queued replies are returned in order; once the queue is empty every
/// request gets a canned echo of its prompt.
pub struct MockInferenceClient {
    replies: Mutex<VecDeque<Result<String, DomainError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    pub fn with_error(self, error: DomainError) -> Self {
        self.push(Err(error));
        self
    }

    pub fn push(&self, reply: Result<String, DomainError>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, DomainError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let scripted = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match scripted {
            Some(reply) => reply,
            None => {
                debug!("MockInferenceClient: no scripted reply, echoing prompt");
                Ok(format!("[{}] You said: {}", request.model(), request.prompt()))
            }
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_replies_come_first_then_echo() {
        let client = MockInferenceClient::new()
            .with_reply("one")
            .with_error(DomainError::unreachable("down"));
        let request = GenerationRequest::new("hello", "m");

        assert_eq!(client.generate(&request).await.unwrap(), "one");
        assert!(client.generate(&request).await.unwrap_err().is_unreachable());
        assert_eq!(
            client.generate(&request).await.unwrap(),
            "[m] You said: hello"
        );
        assert_eq!(client.requests().len(), 3);
    }
}
