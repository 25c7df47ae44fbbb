/// Command and response wire types.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BotCommand {
    /// Clear question state, set the run flag, start the loop.
    StartBot,
    /// Drop the run flag; the loop exits at its next check.
    StopBot,
    Ping,
    GetStatus,
}

impl BotCommand {
    pub const ALL: [BotCommand; 4] = [Self::StartBot, Self::StopBot, Self::Ping, Self::GetStatus];

    /// Wire name of the command.
    pub fn action(&self) -> &'static str {
        match self {
            Self::StartBot => "start_bot",
            Self::StopBot => "stop_bot",
            Self::Ping => "ping",
            Self::GetStatus => "get_status",
        }
    }

    pub fn from_action(action: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.action() == action)
    }
}

/// Reply sent back for every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pong: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResponse {
    pub fn ok() -> Self {
        Self { ok: true, pong: None, running: None, error: None }
    }

    pub fn pong() -> Self {
        Self { pong: Some(true), ..Self::ok() }
    }

    pub fn status(running: bool) -> Self {
        Self { running: Some(running), ..Self::ok() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { ok: false, error: Some(message.into()), ..Self::ok() }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"ok":false}"#.to_string())
    }
}
