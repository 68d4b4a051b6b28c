pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::Commands;

pub use application::{
    ConversationController, ConversationSettings, InferenceClient, KeyValueStore,
    RelayChatInput, RelayChatUseCase, TranscriptLog, TurnOutcome,
};

pub use connector::{
    Container, ContainerConfig, FileKeyValueStore, FileTranscriptLog, InMemoryKeyValueStore,
    MockInferenceClient, OllamaClient, RelayProxyClient, RelayServer, RelayServerConfig, Router,
};

pub use domain::{
    Conversation, DomainError, ErrorKind, GenerationRequest, Message, MessageStatus, Sender,
};
