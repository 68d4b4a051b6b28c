use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::domain::{Conversation, Message, Sender};

use super::super::Container;

pub struct HistoryController<'a> {
    container: &'a Container,
}

impl<'a> HistoryController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn show(&self) -> Result<String> {
        let controller = self.container.conversation_controller().await;
        Ok(self.format_history(controller.conversation()))
    }

    /// Clears the stored conversation. Without `yes`, asks on stdin first.
    pub async fn clear(&self, yes: bool) -> Result<String> {
        let mut controller = self.container.conversation_controller().await;
        let count = controller.conversation().len();

        if count > 0 && !yes {
            eprint!("Clear {} messages? [y/N] ", count);
            io::stderr().flush()?;
            if !confirm(&mut io::stdin().lock())? {
                return Ok("Aborted.".to_string());
            }
        }

        // An empty load may still leave an unreadable entry behind; drop it too.
        controller.request_clear();
        controller.confirm_clear().await?;

        if count == 0 {
            Ok("No conversation history.".to_string())
        } else {
            Ok(format!("Cleared {} messages.", count))
        }
    }

    fn format_history(&self, conversation: &Conversation) -> String {
        if conversation.is_empty() {
            return "No conversation history.".to_string();
        }

        conversation
            .messages()
            .iter()
            .map(format_message)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn format_message(message: &Message) -> String {
    let label = match message.sender() {
        Sender::User => "You",
        Sender::Assistant if message.is_error() => "Assistant (error)",
        Sender::Assistant => "Assistant",
    };
    format!("{}: {}", label, message.text())
}

fn confirm(reader: &mut impl BufRead) -> io::Result<bool> {
    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}
