use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::application::{InferenceClient, TranscriptLog};
use crate::domain::{DomainError, GenerationRequest, Sender};

pub const NOT_CONFIGURED_MESSAGE: &str =
    "OLLAMA_URL is not configured. Set it in the proxy's environment to your Ollama or tunnel base URL.";
pub const INVALID_PROMPT_MESSAGE: &str = "Missing or invalid \"prompt\" in request body";

/// A chat request as received by the relay, before validation.
#[derive(Debug, Clone, Default)]
pub struct RelayChatInput {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
}

impl RelayChatInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Stateless relay step: validate, forward upstream, record the transcript.
pub struct RelayChatUseCase {
    upstream: Option<Arc<dyn InferenceClient>>,
    transcript: Option<Arc<dyn TranscriptLog>>,
    default_model: String,
}

impl RelayChatUseCase {
    pub fn new(upstream: Option<Arc<dyn InferenceClient>>, default_model: impl Into<String>) -> Self {
        Self {
            upstream,
            transcript: None,
            default_model: default_model.into(),
        }
    }

    pub fn with_transcript(mut self, transcript: Arc<dyn TranscriptLog>) -> Self {
        self.transcript = Some(transcript);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.upstream.is_some()
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub async fn execute(&self, input: RelayChatInput) -> Result<String, DomainError> {
        // Missing upstream is a deployment problem; report it before looking at the body.
        let upstream = self
            .upstream
            .as_ref()
            .ok_or_else(|| DomainError::configuration(NOT_CONFIGURED_MESSAGE))?;

        let prompt = input
            .prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| DomainError::invalid_input(INVALID_PROMPT_MESSAGE))?;

        let model = input
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.default_model.clone());

        let request = GenerationRequest::new(prompt, model)
            .with_optional_preamble(input.system_prompt.as_deref());

        if let Some(ref transcript) = self.transcript {
            transcript.append(Sender::User, request.prompt()).await?;
        }

        debug!(
            "Relaying prompt ({} chars) to {} with model {}",
            request.prompt().len(),
            upstream.describe(),
            request.model()
        );
        let start_time = Instant::now();

        let text = match upstream.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Relay to upstream failed ({}): {}", e.kind().as_str(), e);
                return Err(e);
            }
        };

        info!(
            "Relayed response for model {} in {:.2}s",
            request.model(),
            start_time.elapsed().as_secs_f64()
        );

        if let Some(ref transcript) = self.transcript {
            transcript.append(Sender::Assistant, &text).await?;
        }

        Ok(text)
    }
}
