//! Responder exposed over the stdio plugin protocol.

use std::sync::Arc;

use anyhow::Result;

use respond_config::RespondConfig;
use respond_plugin_sdk::{InitializeParams, MessagePlugin};
use respond_responder::Responder;
use respond_storage::Brain;
use respond_types::{InboundMessage, OutboundMessage, PluginStatus};

pub struct ResponderPlugin {
    config: RespondConfig,
    brain: Arc<dyn Brain>,
    responder: Option<Responder>,
}

impl ResponderPlugin {
    pub fn new(config: RespondConfig, brain: Arc<dyn Brain>) -> Self {
        Self {
            config,
            brain,
            responder: None,
        }
    }
}

#[async_trait::async_trait]
impl MessagePlugin for ResponderPlugin {
    fn name(&self) -> &str {
        "respond"
    }

    async fn initialize(&mut self, params: &InitializeParams) -> Result<()> {
        // The host knows the robot's real name; it wins over local config.
        self.config.robot.name = params.robot_name.clone();
        if params.robot_alias.is_some() {
            self.config.robot.alias = params.robot_alias.clone();
        }
        self.responder = Some(Responder::from_config(&self.config, self.brain.clone())?);
        Ok(())
    }

    async fn on_message(&self, message: InboundMessage) -> Result<Vec<OutboundMessage>> {
        let Some(responder) = &self.responder else {
            anyhow::bail!("Plugin not initialized");
        };
        Ok(responder.handle(&message).await?)
    }

    fn status(&self) -> PluginStatus {
        match self.responder {
            Some(_) => PluginStatus::Running,
            None => PluginStatus::Stopped,
        }
    }
}
