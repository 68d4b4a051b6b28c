mod conversation_controller;
mod relay_chat;

pub use conversation_controller::*;
pub use relay_chat::*;
