mod inference_client;
mod key_value_store;
mod transcript_log;

pub use inference_client::*;
pub use key_value_store::*;
pub use transcript_log::*;
