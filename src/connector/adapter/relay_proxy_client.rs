use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::InferenceClient;
use crate::connector::adapter::ollama_client::transport_failure;
use crate::domain::{
    classify_upstream_failure, normalize_response, DomainError, FailureContext,
    GenerationRequest,
};

const CHAT_PATH: &str = "/chat";

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    prompt: &'a str,
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_prompt: Option<&'a str>,
}

#[derive(Deserialize, Default)]
struct ChatResponseBody {
    response: Option<String>,
    error: Option<String>,
    message: Option<String>,
}

/// Sends prompts through the relay proxy's `POST /chat` instead of talking to
/// the inference server directly.
///
/// The proxy has already classified upstream failures; its `{"error": ...}`
/// text is preserved where it is more specific than ours.
pub struct RelayProxyClient {
    client: reqwest::Client,
    base_url: String,
    url: String,
}

impl RelayProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        let trimmed = base.trim_end_matches('/').to_string();
        let url = format!("{trimmed}{CHAT_PATH}");
        Self {
            client: reqwest::Client::new(),
            base_url: trimmed,
            url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn proxy_error(&self, status: u16, message: String, model: &str) -> DomainError {
        let message = if message.trim().is_empty() {
            format!("Proxy error: {status}")
        } else {
            message
        };

        match status {
            400 => DomainError::invalid_input(message),
            503 => DomainError::configuration(message),
            _ => {
                let context = FailureContext::new(model).with_target(&self.base_url);
                match classify_upstream_failure(Some(status), &message, None, context) {
                    DomainError::UpstreamUnreachable(_) => DomainError::unreachable(message),
                    other => other,
                }
            }
        }
    }
}

#[async_trait]
impl InferenceClient for RelayProxyClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, DomainError> {
        let body = ChatRequestBody {
            prompt: request.prompt(),
            model: request.model(),
            system_prompt: request.system_preamble(),
        };
        let context = FailureContext::new(request.model()).with_target(&self.base_url);

        let response = match self.client.post(&self.url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("RelayProxyClient: request to {} failed: {e}", self.url);
                return Err(classify_upstream_failure(
                    None,
                    "",
                    Some(&transport_failure(&e)),
                    context,
                ));
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            classify_upstream_failure(None, "", Some(&transport_failure(&e)), context)
        })?;
        let parsed: ChatResponseBody = serde_json::from_str(&text).unwrap_or_default();

        if !status.is_success() {
            let message = parsed.error.or(parsed.message).unwrap_or_default();
            warn!("RelayProxyClient: proxy returned {status}: {message}");
            return Err(self.proxy_error(status.as_u16(), message, request.model()));
        }

        Ok(normalize_response(parsed.response.as_deref()))
    }

    fn describe(&self) -> String {
        format!("relay proxy {}", self.base_url)
    }
}
