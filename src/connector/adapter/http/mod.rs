pub mod handlers;
mod server;

pub use handlers::{ApiError, ChatRequestBody, ChatResponseBody, HealthResponse, HEALTH_MESSAGE};
pub use server::{RelayServer, RelayServerConfig};
