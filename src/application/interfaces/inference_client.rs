use async_trait::async_trait;

use crate::domain::{DomainError, GenerationRequest};

/// Produces one complete (non-streamed) generation for a request.
///
/// Implementors own transport and wire-format details and must classify
/// failures with [`crate::domain::classify_upstream_failure`] so every caller
/// sees the same messages.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, DomainError>;

    /// Short label for logs, e.g. `ollama http://localhost:11434`.
    fn describe(&self) -> String;
}
