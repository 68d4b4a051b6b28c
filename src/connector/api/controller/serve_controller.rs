use std::sync::Arc;

use anyhow::Result;

use crate::connector::adapter::{RelayServer, RelayServerConfig};

use super::super::Container;

pub struct ServeController<'a> {
    container: &'a Container,
}

impl<'a> ServeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn serve(
        &self,
        upstream_url: Option<String>,
        port: u16,
        public: bool,
        transcript: Option<String>,
    ) -> Result<String> {
        let use_case = self
            .container
            .relay_use_case(upstream_url.as_deref(), transcript.as_deref())
            .await?;

        let config = if public {
            RelayServerConfig::public(port)
        } else {
            RelayServerConfig::local(port)
        };

        RelayServer::new(config, Arc::new(use_case)).serve().await?;
        Ok(String::new())
    }
}
