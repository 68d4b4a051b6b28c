//! Domain services containing the relay path's pure decision logic.

mod error_classifier;

pub use error_classifier::*;
