mod conversation;
mod generation;
mod message;

pub use conversation::*;
pub use generation::*;
pub use message::*;
