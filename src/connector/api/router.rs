use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{AskController, ChatController, HistoryController, ServeController};

pub struct Router<'a> {
    serve_controller: ServeController<'a>,
    chat_controller: ChatController<'a>,
    ask_controller: AskController<'a>,
    history_controller: HistoryController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            serve_controller: ServeController::new(container),
            chat_controller: ChatController::new(container),
            ask_controller: AskController::new(container),
            history_controller: HistoryController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Serve {
                upstream_url,
                port,
                public,
                transcript,
            } => {
                self.serve_controller
                    .serve(upstream_url, port, public, transcript)
                    .await
            }
            Commands::Chat => self.chat_controller.chat().await,
            Commands::Ask { prompt } => self.ask_controller.ask(prompt.join(" ")).await,
            Commands::History { clear, yes } => {
                if clear {
                    self.history_controller.clear(yes).await
                } else {
                    self.history_controller.show().await
                }
            }
        }
    }
}
