//! Terminal chat front end built on ratatui and crossterm.

pub mod app;
pub mod terminal;
pub mod ui;

use anyhow::Result;

use crate::application::ConversationController;

pub use app::ChatApp;
pub use terminal::{AppEvent, EventHandler};

/// Runs the chat screen until the user quits. The terminal is restored on
/// every exit path, including errors from the draw loop.
pub async fn run(controller: ConversationController) -> Result<()> {
    terminal::install_panic_hook();
    let mut tui = terminal::init()?;
    let result = event_loop(&mut tui, ChatApp::new(controller)).await;
    terminal::restore()?;
    result
}

async fn event_loop(tui: &mut terminal::Tui, mut app: ChatApp) -> Result<()> {
    let mut events = EventHandler::new();
    let tx = events.sender();

    while !app.should_quit() {
        tui.draw(|frame| ui::render(frame, &app))?;
        match events.next().await {
            Some(event) => app.handle_event(event, &tx).await,
            None => break,
        }
    }

    Ok(())
}
