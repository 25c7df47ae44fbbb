//! Bot controller. Owns the polling task and turns commands into run-flag
//! transitions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quizpilot_browser::DocumentTree;
use quizpilot_core::{QuestionStateStore, Result, RunFlag};
use quizpilot_executor::QuestionCoordinator;
use quizpilot_scheduler::{PollingConfig, PollingLoop};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dispatch::CommandHandler;
use crate::types::{BotCommand, CommandResponse};

pub struct BotController {
    polling: PollingLoop,
    state: QuestionStateStore,
    task: Mutex<Option<JoinHandle<u64>>>,
    spawned: AtomicUsize,
}

impl BotController {
    /// Create the controller, resuming the loop if the run flag is already set.
    ///
    /// Resuming needs a Tokio runtime; without one the flag is left as is and
    /// the next `start_bot` starts the loop.
    pub fn new(polling: PollingLoop, state: QuestionStateStore) -> Self {
        let controller = Self { polling, state, task: Mutex::new(None), spawned: AtomicUsize::new(0) };
        if controller.is_running() {
            info!("Run flag already set; resuming loop");
            controller.ensure_loop();
        }
        controller
    }

    /// Controller driving `coordinator`, sharing its run flag and question state.
    pub fn for_coordinator<D>(coordinator: QuestionCoordinator<D>, config: PollingConfig) -> Self
    where
        D: DocumentTree + ?Sized + 'static,
    {
        let run_flag = coordinator.run_flag().clone();
        let state = coordinator.state().clone();
        Self::new(PollingLoop::new(Arc::new(coordinator), run_flag, config), state)
    }

    pub fn run_flag(&self) -> &RunFlag {
        self.polling.run_flag()
    }

    pub fn is_running(&self) -> bool {
        self.run_flag().is_running()
    }

    /// True from spawning a loop until that loop stops polling.
    pub fn loop_active(&self) -> bool {
        self.polling.is_active()
    }

    /// Number of loop tasks spawned over the controller's lifetime.
    pub fn loops_spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    /// Clear question state, set the flag, and make sure a loop is running.
    pub fn start(&self) -> Result<()> {
        self.state.clear()?;
        self.run_flag().set_running(true)?;
        self.ensure_loop();
        Ok(())
    }

    /// Drop the run flag. The loop finishes its current cycle and exits.
    pub fn stop(&self) -> Result<()> {
        self.run_flag().set_running(false)
    }

    /// Take the loop handle, if any, so the caller can await the loop's exit.
    pub fn take_task(&self) -> Option<JoinHandle<u64>> {
        self.task.lock().unwrap_or_else(|e| e.into_inner()).take()
    }

    /// Spawn the loop unless one is still active. True when a new task was spawned.
    fn ensure_loop(&self) -> bool {
        if Handle::try_current().is_err() {
            warn!("No async runtime; loop not started");
            return false;
        }
        if !self.polling.try_claim() {
            debug!("Loop already active");
            return false;
        }
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        *task = Some(self.polling.clone().spawn());
        self.spawned.fetch_add(1, Ordering::SeqCst);
        true
    }
}

#[async_trait]
impl CommandHandler for BotController {
    async fn handle(&self, command: BotCommand) -> Result<CommandResponse> {
        match command {
            BotCommand::StartBot => {
                self.start()?;
                info!("Bot started");
                Ok(CommandResponse::ok())
            }
            BotCommand::StopBot => {
                self.stop()?;
                info!("Bot stopped");
                Ok(CommandResponse::ok())
            }
            BotCommand::Ping => Ok(CommandResponse::pong()),
            BotCommand::GetStatus => Ok(CommandResponse::status(self.is_running())),
        }
    }
}
