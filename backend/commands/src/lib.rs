//! Command interface for the QuizPilot loop.
//!
//! Messages arrive as JSON objects with an `action` field (`start_bot`,
//! `stop_bot`, `ping`, `get_status`) and get a JSON reply with an `ok` flag.

pub mod controller;
pub mod dispatch;
pub mod types;

pub use controller::BotController;
pub use dispatch::{CommandDispatcher, CommandHandler};
pub use types::{BotCommand, CommandResponse};

use std::sync::Arc;

/// Build a dispatcher that routes every action to `controller`.
pub fn build_default_dispatcher(controller: Arc<BotController>) -> CommandDispatcher {
    let mut dispatcher = CommandDispatcher::new();
    for command in BotCommand::ALL {
        dispatcher.register(command.action(), controller.clone());
    }
    dispatcher
}
