/// Command dispatch: parse a JSON message and route it to a handler.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use quizpilot_core::Result;
use serde_json::Value;
use tracing::{info, warn};

use crate::types::{BotCommand, CommandResponse};

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: BotCommand) -> Result<CommandResponse>;
}

pub struct CommandDispatcher {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    pub fn register(&mut self, action: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(action.into(), handler);
    }

    /// Handle one raw message. Never fails; problems become `ok:false` replies.
    pub async fn dispatch(&self, raw: &str) -> CommandResponse {
        let message: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Malformed command message");
                return CommandResponse::error(format!("invalid message: {e}"));
            }
        };
        let Some(action) = message.get("action").and_then(Value::as_str) else {
            return CommandResponse::error("missing action");
        };
        let (Some(command), Some(handler)) = (BotCommand::from_action(action), self.handlers.get(action))
        else {
            warn!(action, "Unknown command");
            return CommandResponse::error(format!("unknown action: {action}"));
        };

        info!(action, "Dispatching command");
        match handler.handle(command).await {
            Ok(response) => response,
            Err(e) => {
                warn!(action, error = %e, "Command failed");
                CommandResponse::error(e.to_string())
            }
        }
    }

    /// [`dispatch`](Self::dispatch) with the reply serialized.
    pub async fn dispatch_json(&self, raw: &str) -> String {
        self.dispatch(raw).await.to_json()
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl CommandHandler for Echo {
        async fn handle(&self, command: BotCommand) -> Result<CommandResponse> {
            match command {
                BotCommand::Ping => Ok(CommandResponse::pong()),
                _ => Err(quizpilot_core::QuizError::Storage("nope".into())),
            }
        }
    }

    fn dispatcher() -> CommandDispatcher {
        let mut d = CommandDispatcher::new();
        d.register("ping", Arc::new(Echo));
        d.register("stop_bot", Arc::new(Echo));
        d
    }

    #[tokio::test]
    async fn routes_known_actions() {
        assert_eq!(dispatcher().dispatch_json(r#"{"action":"ping"}"#).await, r#"{"ok":true,"pong":true}"#);
    }

    #[tokio::test]
    async fn rejects_unknown_and_unregistered() {
        let d = dispatcher();
        assert_eq!(
            d.dispatch(r#"{"action":"dance"}"#).await,
            CommandResponse::error("unknown action: dance")
        );
        assert_eq!(
            d.dispatch(r#"{"action":"get_status"}"#).await,
            CommandResponse::error("unknown action: get_status")
        );
    }

    #[tokio::test]
    async fn malformed_messages_are_errors() {
        let d = dispatcher();
        assert_eq!(d.dispatch(r#"{"type":"ping"}"#).await, CommandResponse::error("missing action"));
        assert!(!d.dispatch("not json").await.ok);
    }

    #[tokio::test]
    async fn handler_errors_become_replies() {
        let reply = dispatcher().dispatch(r#"{"action":"stop_bot"}"#).await;
        assert!(!reply.ok);
        assert!(reply.error.unwrap().contains("nope"));
    }
}
