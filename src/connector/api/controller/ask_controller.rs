use anyhow::{bail, Result};

use crate::application::{SubmitRejection, TurnOutcome};

use super::super::Container;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Runs one turn and records it in the stored history like a TUI turn.
    pub async fn ask(&self, prompt: String) -> Result<String> {
        let mut controller = self.container.conversation_controller().await;

        match controller.submit(&prompt).await {
            Ok(TurnOutcome::Resolved(message)) => Ok(message.text().to_string()),
            Ok(TurnOutcome::Errored(message)) => bail!("{}", message.text()),
            Err(SubmitRejection::EmptyInput) => bail!("Prompt is empty"),
            Err(SubmitRejection::RequestInFlight) => bail!("A request is already in flight"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::api::ContainerConfig;

    fn container() -> Container {
        Container::new(ContainerConfig {
            data_dir: "/nonexistent".to_string(),
            model: "dolphin-llama3".to_string(),
            system_prompt: None,
            proxy_url: None,
            ollama_url: None,
            mock_inference: true,
            memory_storage: true,
        })
    }

    #[tokio::test]
    async fn ask_returns_the_reply() {
        let container = container();
        let output = AskController::new(&container)
            .ask("hello".to_string())
            .await
            .unwrap();
        assert_eq!(output, "[dolphin-llama3] You said: hello");
    }

    #[tokio::test]
    async fn blank_prompt_is_an_error() {
        let container = container();
        let err = AskController::new(&container)
            .ask("   ".to_string())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
