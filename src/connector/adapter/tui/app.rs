use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::application::{ConversationController, PendingTurn, SubmitRejection};
use crate::domain::DomainError;

use super::terminal::AppEvent;

/// View state wrapped around the conversation controller.
pub struct ChatApp {
    controller: ConversationController,
    input: String,
    in_flight: Option<PendingTurn>,
    tick: usize,
    should_quit: bool,
}

impl ChatApp {
    pub fn new(controller: ConversationController) -> Self {
        Self {
            controller,
            input: String::new(),
            in_flight: None,
            tick: 0,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Input is disabled while a response is outstanding.
    pub fn input_enabled(&self) -> bool {
        !self.controller.is_awaiting_response()
    }

    pub async fn handle_event(&mut self, event: AppEvent, tx: &UnboundedSender<AppEvent>) {
        match event {
            AppEvent::Key(key) => self.handle_key(key, tx).await,
            AppEvent::Tick => self.tick = self.tick.wrapping_add(1),
            AppEvent::Resize(_, _) => {}
            AppEvent::Generation(result) => self.finish_turn(result).await,
        }
    }

    async fn handle_key(&mut self, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.controller.is_clear_requested() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    if let Err(e) = self.controller.confirm_clear().await {
                        warn!("Failed to clear stored conversation: {}", e);
                    }
                }
                _ => self.controller.cancel_clear(),
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                if self.controller.error_banner().is_some() {
                    self.controller.dismiss_error();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('l') if ctrl => {
                if !self.controller.request_clear() {
                    debug!("Clear refused while a request is in flight");
                }
            }
            KeyCode::Enter => self.submit(tx).await,
            KeyCode::Backspace if self.input_enabled() => {
                self.input.pop();
            }
            KeyCode::Char(c) if self.input_enabled() && !ctrl => self.input.push(c),
            _ => {}
        }
    }

    async fn submit(&mut self, tx: &UnboundedSender<AppEvent>) {
        let turn = match self.controller.begin(&self.input).await {
            Ok(turn) => turn,
            Err(SubmitRejection::EmptyInput) => return,
            Err(SubmitRejection::RequestInFlight) => {
                debug!("Submit ignored: request already in flight");
                return;
            }
        };
        self.input.clear();

        let client = self.controller.inference_client();
        let request = turn.request().clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.generate(&request).await;
            let _ = tx.send(AppEvent::Generation(result));
        });

        self.in_flight = Some(turn);
    }

    async fn finish_turn(&mut self, result: Result<String, DomainError>) {
        match self.in_flight.take() {
            Some(turn) => {
                self.controller.complete(turn, result).await;
            }
            None => warn!("Generation result arrived with no request in flight"),
        }
    }
}
