use anyhow::Result;

use crate::connector::adapter::tui;

use super::super::Container;

pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn chat(&self) -> Result<String> {
        let controller = self.container.conversation_controller().await;
        tui::run(controller).await?;
        Ok(String::new())
    }
}
