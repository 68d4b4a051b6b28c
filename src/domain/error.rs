use thiserror::Error;

/// Coarse classification of every failure the relay path can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Configuration,
    UpstreamNotFound,
    UpstreamUnreachable,
    UpstreamOther,
    TransportFailure,
    PersistenceParse,
    Storage,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Configuration => "configuration",
            ErrorKind::UpstreamNotFound => "upstream_not_found",
            ErrorKind::UpstreamUnreachable => "upstream_unreachable",
            ErrorKind::UpstreamOther => "upstream_other",
            ErrorKind::TransportFailure => "transport_failure",
            ErrorKind::PersistenceParse => "persistence_parse",
            ErrorKind::Storage => "storage",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Display strings are user-facing: they end up verbatim in chat bubbles and
/// in `{"error": ...}` response bodies.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Configuration(String),

    #[error("Model \"{model}\" not found. Pull it with: ollama pull {model}")]
    ModelNotFound { model: String },

    #[error("{0}")]
    UpstreamUnreachable(String),

    #[error("{}", upstream_status_message(.status, .body))]
    UpstreamStatus { status: u16, body: String },

    #[error("{0}")]
    Transport(String),

    #[error("Stored conversation could not be parsed: {0}")]
    PersistenceParse(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn upstream_status_message(status: &u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("Ollama error: {}", status)
    } else {
        body.to_string()
    }
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn model_not_found(model: impl Into<String>) -> Self {
        Self::ModelNotFound {
            model: model.into(),
        }
    }

    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::UpstreamUnreachable(msg.into())
    }

    pub fn upstream_status(status: u16, body: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            status,
            body: body.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn persistence_parse(msg: impl Into<String>) -> Self {
        Self::PersistenceParse(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::Validation,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::ModelNotFound { .. } => ErrorKind::UpstreamNotFound,
            Self::UpstreamUnreachable(_) => ErrorKind::UpstreamUnreachable,
            Self::UpstreamStatus { .. } => ErrorKind::UpstreamOther,
            Self::Transport(_) => ErrorKind::TransportFailure,
            Self::PersistenceParse(_) => ErrorKind::PersistenceParse,
            Self::StorageError(_) | Self::IoError(_) => ErrorKind::Storage,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::UpstreamUnreachable(_))
    }

    /// The text shown to the user in an error bubble and banner.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_not_found_names_model_and_remedy() {
        let err = DomainError::model_not_found("dolphin-llama3");
        let msg = err.user_message();
        assert!(msg.contains("\"dolphin-llama3\""));
        assert!(msg.contains("ollama pull dolphin-llama3"));
        assert_eq!(err.kind(), ErrorKind::UpstreamNotFound);
    }

    #[test]
    fn upstream_status_falls_back_to_status_code_on_empty_body() {
        let err = DomainError::upstream_status(500, "   ");
        assert_eq!(err.user_message(), "Ollama error: 500");

        let err = DomainError::upstream_status(500, "model is loading");
        assert_eq!(err.user_message(), "model is loading");
        assert_eq!(err.kind(), ErrorKind::UpstreamOther);
    }

    #[test]
    fn io_errors_classify_as_storage() {
        let err: DomainError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
}
