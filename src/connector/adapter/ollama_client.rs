use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::InferenceClient;
use crate::domain::{
    classify_upstream_failure, normalize_response, DomainError, FailureContext,
    GenerationRequest, TransportFailure,
};

/// Default target: Ollama running locally on its standard port.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const GENERATE_PATH: &str = "/api/generate";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Subset of Ollama's `/api/generate` reply we care about.
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Talks to an Ollama-compatible server's single-shot completion endpoint.
///
/// Streaming is always disabled: one request, one complete answer. No timeout
/// is configured, so a hung upstream holds the call until the transport gives
/// up.
///
/// Failures are classified with [`classify_upstream_failure`]. By default the
/// base URL appears in "unreachable" messages; the relay proxy builds its
/// client with [`OllamaClient::hide_location`] so callers never learn where the
/// upstream lives.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    /// Full endpoint URL (base + GENERATE_PATH).
    url: String,
    expose_location: bool,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        let trimmed = base.trim_end_matches('/').to_string();
        let url = format!("{trimmed}{GENERATE_PATH}");
        Self {
            client: reqwest::Client::new(),
            base_url: trimmed,
            url,
            expose_location: true,
        }
    }

    pub fn hide_location(mut self) -> Self {
        self.expose_location = false;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn context<'a>(&'a self, model: &'a str) -> FailureContext<'a> {
        let context = FailureContext::new(model);
        if self.expose_location {
            context.with_target(&self.base_url)
        } else {
            context
        }
    }
}

/// Splits reqwest errors into "could not connect" and everything else.
pub(crate) fn transport_failure(e: &reqwest::Error) -> TransportFailure {
    if e.is_connect() {
        TransportFailure::connect(e.to_string())
    } else {
        TransportFailure::other(e.to_string())
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, DomainError> {
        let prompt = request.full_prompt();
        let body = GenerateRequest {
            model: request.model(),
            prompt: &prompt,
            stream: false,
        };
        let context = self.context(request.model());

        let response = match self.client.post(&self.url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("OllamaClient: request to {} failed: {e}", self.url);
                return Err(classify_upstream_failure(
                    None,
                    "",
                    Some(&transport_failure(&e)),
                    context,
                ));
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            warn!("OllamaClient: API returned {status}: {text}");
            return Err(classify_upstream_failure(Some(status), &text, None, context));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            warn!("OllamaClient: unreadable reply from {}: {e}", self.url);
            classify_upstream_failure(
                None,
                "",
                Some(&TransportFailure::other(format!("invalid response body: {e}"))),
                context,
            )
        })?;

        debug!(
            "OllamaClient: received {} chars",
            parsed.response.as_deref().map(str::len).unwrap_or(0)
        );

        Ok(normalize_response(parsed.response.as_deref()))
    }

    fn describe(&self) -> String {
        format!("ollama {}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_strips_trailing_slash() {
        let client = OllamaClient::new("https://abc.trycloudflare.com/");
        assert_eq!(client.base_url(), "https://abc.trycloudflare.com");
        assert_eq!(client.url, "https://abc.trycloudflare.com/api/generate");
    }

    #[test]
    fn request_body_disables_streaming() {
        let body = GenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"model": "m", "prompt": "p", "stream": false}));
    }

    #[test]
    fn hidden_location_is_left_out_of_context() {
        let client = OllamaClient::new(DEFAULT_OLLAMA_URL).hide_location();
        assert!(client.context("m").target.is_none());
        let client = OllamaClient::new(DEFAULT_OLLAMA_URL);
        assert_eq!(client.context("m").target, Some(DEFAULT_OLLAMA_URL));
    }
}
