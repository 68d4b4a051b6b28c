//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Inference (Ollama over HTTP, the relay proxy, a scripted mock)
//! - Storage (JSON file and in-memory key-value stores, transcript file)
//! - Serving (axum relay proxy) and presenting (terminal UI)
//! - Wiring (container, CLI router and controllers)

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
