use async_trait::async_trait;

use crate::domain::DomainError;

/// Durable client-local string storage keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), DomainError>;
}
