use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{InferenceClient, KeyValueStore};
use crate::domain::{Conversation, DomainError, GenerationRequest, Message, DEFAULT_MODEL};

/// Key under which the conversation snapshot is stored.
pub const CONVERSATION_STORAGE_KEY: &str = "chatrelay.conversation";

/// Where the controller is in the submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Submitting,
    AwaitingResponse,
}

/// Why a submission was ignored. Rejections never touch the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    EmptyInput,
    RequestInFlight,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Resolved(Message),
    Errored(Message),
}

impl TurnOutcome {
    pub fn message(&self) -> &Message {
        match self {
            TurnOutcome::Resolved(m) | TurnOutcome::Errored(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TurnOutcome::Errored(_))
    }
}

/// Handle for one in-flight request, returned by [`ConversationController::begin`].
#[derive(Debug, Clone)]
pub struct PendingTurn {
    placeholder_id: String,
    request: GenerationRequest,
}

impl PendingTurn {
    pub fn id(&self) -> &str {
        &self.placeholder_id
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }
}

/// Settings applied to every request the controller builds.
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    pub model: String,
    pub system_preamble: Option<String>,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_preamble: None,
        }
    }
}

/// Owns the conversation and drives the optimistic-UI cycle:
/// `Idle -> Submitting -> AwaitingResponse -> (Resolved | Errored) -> Idle`.
///
/// Every change to the committed messages is written through to the
/// [`KeyValueStore`] before the method returns.
pub struct ConversationController {
    conversation: Conversation,
    phase: ControllerPhase,
    error_banner: Option<String>,
    clear_requested: bool,
    settings: ConversationSettings,
    client: Arc<dyn InferenceClient>,
    store: Arc<dyn KeyValueStore>,
}

impl ConversationController {
    /// Restores the stored conversation. Unreadable or corrupt history is
    /// logged and replaced with an empty conversation.
    pub async fn load(
        client: Arc<dyn InferenceClient>,
        store: Arc<dyn KeyValueStore>,
        settings: ConversationSettings,
    ) -> Self {
        let conversation = match Self::restore(store.as_ref()).await {
            Ok(conversation) => conversation,
            Err(e) => {
                warn!("Discarding stored conversation: {}", e);
                Conversation::new()
            }
        };

        debug!(
            "Loaded conversation with {} messages",
            conversation.len()
        );

        Self {
            conversation,
            phase: ControllerPhase::Idle,
            error_banner: None,
            clear_requested: false,
            settings,
            client,
            store,
        }
    }

    async fn restore(store: &dyn KeyValueStore) -> Result<Conversation, DomainError> {
        match store.get(CONVERSATION_STORAGE_KEY).await? {
            Some(json) => Conversation::from_snapshot(&json)
                .map_err(|e| DomainError::persistence_parse(e.to_string())),
            None => Ok(Conversation::new()),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.phase == ControllerPhase::AwaitingResponse
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    pub fn settings(&self) -> &ConversationSettings {
        &self.settings
    }

    pub fn inference_client(&self) -> Arc<dyn InferenceClient> {
        Arc::clone(&self.client)
    }

    /// Starts a turn: records the user message and the typing placeholder.
    pub async fn begin(&mut self, text: &str) -> Result<PendingTurn, SubmitRejection> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitRejection::EmptyInput);
        }
        if self.phase != ControllerPhase::Idle || self.conversation.has_pending() {
            debug!("Ignoring submit while a request is in flight");
            return Err(SubmitRejection::RequestInFlight);
        }

        self.phase = ControllerPhase::Submitting;
        self.error_banner = None;
        self.clear_requested = false;

        self.conversation.push(Message::user(text));
        let placeholder = Message::pending();
        let placeholder_id = placeholder.id().to_string();
        self.conversation.set_pending(placeholder);
        self.persist().await;

        self.phase = ControllerPhase::AwaitingResponse;

        let request = GenerationRequest::new(text, self.settings.model.clone())
            .with_optional_preamble(self.settings.system_preamble.as_deref());

        Ok(PendingTurn {
            placeholder_id,
            request,
        })
    }

    /// Finishes a turn started by [`Self::begin`]. Returns `None` for a turn
    /// that no longer owns the placeholder.
    pub async fn complete(
        &mut self,
        turn: PendingTurn,
        result: Result<String, DomainError>,
    ) -> Option<TurnOutcome> {
        match self.conversation.pending() {
            Some(p) if p.id() == turn.placeholder_id => {}
            _ => {
                warn!("Dropping result for stale turn {}", turn.placeholder_id);
                return None;
            }
        }
        self.conversation.take_pending();

        let outcome = match result {
            Ok(text) => {
                let message = Message::assistant(text);
                self.conversation.push(message.clone());
                TurnOutcome::Resolved(message)
            }
            Err(e) => {
                let text = e.user_message();
                info!("Request failed ({}): {}", e.kind().as_str(), text);
                let message = Message::assistant_error(text.clone());
                self.conversation.push(message.clone());
                self.error_banner = Some(text);
                TurnOutcome::Errored(message)
            }
        };

        self.persist().await;
        self.phase = ControllerPhase::Idle;

        Some(outcome)
    }

    /// Runs a whole turn against the configured inference client.
    pub async fn submit(&mut self, text: &str) -> Result<TurnOutcome, SubmitRejection> {
        let turn = self.begin(text).await?;
        let result = self.client.generate(turn.request()).await;
        self.complete(turn, result)
            .await
            .ok_or(SubmitRejection::RequestInFlight)
    }

    pub fn dismiss_error(&mut self) {
        self.error_banner = None;
    }

    /// Arms the clear confirmation. Refused while a request is in flight.
    pub fn request_clear(&mut self) -> bool {
        if self.phase != ControllerPhase::Idle {
            return false;
        }
        self.clear_requested = true;
        true
    }

    pub fn is_clear_requested(&self) -> bool {
        self.clear_requested
    }

    pub fn cancel_clear(&mut self) {
        self.clear_requested = false;
    }

    /// Empties the conversation and deletes the stored snapshot, but only
    /// after [`Self::request_clear`].
    pub async fn confirm_clear(&mut self) -> Result<bool, DomainError> {
        if !self.clear_requested || self.phase != ControllerPhase::Idle {
            return Ok(false);
        }
        self.clear_requested = false;
        self.conversation.clear();
        self.error_banner = None;
        self.store.delete(CONVERSATION_STORAGE_KEY).await?;
        info!("Conversation cleared");
        Ok(true)
    }

    async fn persist(&self) {
        let snapshot = match self.conversation.snapshot() {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize conversation: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(CONVERSATION_STORAGE_KEY, &snapshot).await {
            warn!("Failed to persist conversation: {}", e);
        }
    }
}
