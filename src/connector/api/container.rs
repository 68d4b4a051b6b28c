use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::application::{
    ConversationController, ConversationSettings, InferenceClient, KeyValueStore,
    RelayChatUseCase,
};
use crate::connector::adapter::{
    FileKeyValueStore, FileTranscriptLog, InMemoryKeyValueStore, MockInferenceClient,
    OllamaClient, RelayProxyClient, DEFAULT_OLLAMA_URL,
};

pub struct ContainerConfig {
    pub data_dir: String,
    pub model: String,
    pub system_prompt: Option<String>,
    /// Relay proxy base URL. When present the client talks to the proxy
    /// instead of the inference server.
    pub proxy_url: Option<String>,
    pub ollama_url: Option<String>,
    pub mock_inference: bool,
    /// Keep history in memory only; nothing is written to the data dir.
    pub memory_storage: bool,
}

pub struct Container {
    inference_client: Arc<dyn InferenceClient>,
    store: Arc<dyn KeyValueStore>,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Self {
        let inference_client: Arc<dyn InferenceClient> = if config.mock_inference {
            debug!("Using mock inference client");
            Arc::new(MockInferenceClient::new())
        } else if let Some(proxy_url) = normalize_base_url(config.proxy_url.as_deref()) {
            debug!("Using relay proxy at {}", proxy_url);
            Arc::new(RelayProxyClient::new(proxy_url))
        } else {
            let ollama_url = normalize_base_url(config.ollama_url.as_deref())
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            debug!("Talking to Ollama directly at {}", ollama_url);
            Arc::new(OllamaClient::new(ollama_url))
        };

        let store: Arc<dyn KeyValueStore> = if config.memory_storage {
            debug!("Using in-memory history storage");
            Arc::new(InMemoryKeyValueStore::new())
        } else {
            let store = FileKeyValueStore::in_dir(&config.data_dir);
            debug!("Using history file {}", store.path().display());
            Arc::new(store)
        };

        Self {
            inference_client,
            store,
            config,
        }
    }

    /// Builds the relay step for `serve`. The upstream location is kept out of
    /// client-facing error messages.
    pub async fn relay_use_case(
        &self,
        upstream_url: Option<&str>,
        transcript: Option<&str>,
    ) -> Result<RelayChatUseCase> {
        let upstream: Option<Arc<dyn InferenceClient>> = if self.config.mock_inference {
            Some(Arc::new(MockInferenceClient::new()))
        } else {
            normalize_base_url(upstream_url).map(|url| {
                debug!("Relaying to upstream at {}", url);
                Arc::new(OllamaClient::new(url).hide_location()) as Arc<dyn InferenceClient>
            })
        };

        let mut use_case = RelayChatUseCase::new(upstream, self.config.model.clone());

        if let Some(path) = transcript.map(str::trim).filter(|p| !p.is_empty()) {
            let log = FileTranscriptLog::open(path).await?;
            debug!("Writing transcript to {}", log.path().display());
            use_case = use_case.with_transcript(Arc::new(log));
        }

        Ok(use_case)
    }

    pub async fn conversation_controller(&self) -> ConversationController {
        ConversationController::load(
            self.inference_client.clone(),
            self.store.clone(),
            self.conversation_settings(),
        )
        .await
    }

    pub fn conversation_settings(&self) -> ConversationSettings {
        ConversationSettings {
            model: self.config.model.clone(),
            system_preamble: self
                .config
                .system_prompt
                .clone()
                .filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn inference_client(&self) -> Arc<dyn InferenceClient> {
        self.inference_client.clone()
    }
}

/// Trims a configured base URL and strips trailing slashes. Blank values count
/// as not configured.
pub fn normalize_base_url(url: Option<&str>) -> Option<String> {
    let url = url?.trim().trim_end_matches('/');
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}
