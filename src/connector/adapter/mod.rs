mod file_key_value_store;
mod file_transcript_log;
pub mod http;
mod in_memory_key_value_store;
mod mock_inference_client;
pub(crate) mod ollama_client;
mod relay_proxy_client;
pub mod tui;

pub use file_key_value_store::*;
pub use file_transcript_log::*;
pub use http::{RelayServer, RelayServerConfig};
pub use in_memory_key_value_store::*;
pub use mock_inference_client::*;
pub use ollama_client::{OllamaClient, DEFAULT_OLLAMA_URL};
pub use relay_proxy_client::*;
