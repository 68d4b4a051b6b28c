use async_trait::async_trait;

use crate::domain::{DomainError, Sender};

/// Append-only diagnostic record of relayed prompts and responses.
///
/// Each call must land as one uninterleaved line even under concurrent
/// writers.
#[async_trait]
pub trait TranscriptLog: Send + Sync {
    async fn append(&self, role: Sender, text: &str) -> Result<(), DomainError>;
}
