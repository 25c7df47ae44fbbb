//! `quizpilot listen`: the command interface over stdin/stdout.
//!
//! One JSON message per input line, one JSON reply per output line. The
//! loop runs against the snapshot until `stop_bot` or end of input.

use std::sync::Arc;

use anyhow::{Context, Result};
use quizpilot_browser::MemoryDocument;
use quizpilot_commands::{build_default_dispatcher, BotController};
use quizpilot_config::QuizPilotConfig;
use quizpilot_core::MemoryStorage;
use quizpilot_executor::QuestionCoordinator;
use quizpilot_scheduler::PollingConfig;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

pub async fn listen(doc: Arc<MemoryDocument>, config: &QuizPilotConfig) -> Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let coordinator = QuestionCoordinator::from_config(doc, storage, config);
    let controller = Arc::new(BotController::for_coordinator(coordinator, PollingConfig::from_config(config)));
    let dispatcher = build_default_dispatcher(controller.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = dispatcher.dispatch_json(&line).await;
        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    info!("Input closed; stopping");
    controller.stop()?;
    if let Some(task) = controller.take_task() {
        let cycles = task.await.context("Loop task panicked")?;
        info!(cycles, "Loop finished");
    }
    Ok(())
}
