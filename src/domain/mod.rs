//! # Domain Layer
//!
//! Messages, conversations, generation requests and the error taxonomy.
//! This layer is independent of HTTP clients, servers and storage.

mod error;
pub mod models;
pub mod services;

pub use error::*;
pub use models::*;
pub use services::*;
