//! Polling loop. Re-runs one question cycle at a fixed interval while the
//! run flag stays set.
//!
//! Stopping is cooperative: the flag is read at the top of each iteration,
//! so a cycle already in flight (including its reveal wait) always finishes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quizpilot_browser::DocumentTree;
use quizpilot_config::QuizPilotConfig;
use quizpilot_core::{CycleOutcome, Result, RunFlag};
use quizpilot_executor::QuestionCoordinator;
use quizpilot_logging::{CycleEvent, EventLogger};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info};

/// One answering attempt, as the loop sees it.
#[async_trait]
pub trait QuestionCycle: Send + Sync {
    async fn run_cycle(&self) -> Result<CycleOutcome>;
}

#[async_trait]
impl<D: DocumentTree + ?Sized + 'static> QuestionCycle for QuestionCoordinator<D> {
    async fn run_cycle(&self) -> Result<CycleOutcome> {
        QuestionCoordinator::run_cycle(self).await
    }
}

#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Pause between cycles.
    pub interval: Duration,
    /// Delay before the first cycle.
    pub start_delay: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self::from_config(&QuizPilotConfig::default())
    }
}

impl PollingConfig {
    pub fn from_config(config: &QuizPilotConfig) -> Self {
        let timing = config.timing();
        Self { interval: timing.poll_interval(), start_delay: timing.start_delay() }
    }
}

/// Run cycles until the run flag reads false. Returns the number of cycles run.
///
/// A failing cycle is logged and the loop carries on after the usual interval.
pub async fn run_poll_loop<C>(cycle: &C, run_flag: &RunFlag, interval: Duration) -> u64
where
    C: QuestionCycle + ?Sized,
{
    poll_until_stopped(cycle, run_flag, interval, &AtomicBool::new(true)).await
}

async fn poll_until_stopped<C>(cycle: &C, run_flag: &RunFlag, interval: Duration, active: &AtomicBool) -> u64
where
    C: QuestionCycle + ?Sized,
{
    let mut guard = ActiveGuard { active, released: false };
    let mut cycles = 0u64;
    EventLogger::log_event(CycleEvent::LoopStarted);
    info!(interval_ms = interval.as_millis() as u64, "Polling loop started");

    while keep_polling(run_flag, active) {
        cycles += 1;
        match cycle.run_cycle().await {
            Ok(outcome) => debug!(cycle = cycles, outcome = %outcome, "Cycle finished"),
            Err(e) => {
                error!(cycle = cycles, error = %e, "Loop error");
                EventLogger::log_event(CycleEvent::CycleFailed { error: e.to_string() });
            }
        }
        time::sleep(interval).await;
    }
    guard.released = true;

    info!(cycles, "Polling loop stopped");
    EventLogger::log_event(CycleEvent::LoopStopped { cycles });
    cycles
}

/// Whether the loop runs another cycle.
///
/// On a cleared flag the loop first marks itself inactive and then reads the
/// flag again. A start that slipped in between the two reads saw the loop as
/// active and spawned nothing, so the loop takes the slot back, unless a new
/// loop claimed it first.
fn keep_polling(run_flag: &RunFlag, active: &AtomicBool) -> bool {
    if run_flag.is_running() {
        return true;
    }
    active.store(false, Ordering::SeqCst);
    if run_flag.is_running() && claim(active) {
        debug!("Flag set again while stopping; continuing");
        return true;
    }
    false
}

fn claim(active: &AtomicBool) -> bool {
    active.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok()
}

/// Clears the active mark when a loop is dropped without stopping normally.
struct ActiveGuard<'a> {
    active: &'a AtomicBool,
    released: bool,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.active.store(false, Ordering::SeqCst);
        }
    }
}

/// A polling loop bound to a cycle and a run flag.
///
/// Clones share one active mark, so at most one of them runs at a time when
/// started through [`PollingLoop::try_claim`].
#[derive(Clone)]
pub struct PollingLoop {
    cycle: Arc<dyn QuestionCycle>,
    run_flag: RunFlag,
    config: PollingConfig,
    active: Arc<AtomicBool>,
}

impl PollingLoop {
    pub fn new(cycle: Arc<dyn QuestionCycle>, run_flag: RunFlag, config: PollingConfig) -> Self {
        Self { cycle, run_flag, config, active: Arc::new(AtomicBool::new(false)) }
    }

    pub fn run_flag(&self) -> &RunFlag {
        &self.run_flag
    }

    pub fn config(&self) -> &PollingConfig {
        &self.config
    }

    /// True from a successful claim (or spawn) until the loop stops.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Mark the loop active unless it already is. True means the caller
    /// must start it.
    pub fn try_claim(&self) -> bool {
        claim(&self.active)
    }

    /// Run in the current task until the flag drops.
    pub async fn run(&self) -> u64 {
        self.active.store(true, Ordering::SeqCst);
        poll_until_stopped(self.cycle.as_ref(), &self.run_flag, self.config.interval, &self.active).await
    }

    /// Spawn onto the runtime, waiting `start_delay` before the first cycle.
    pub fn spawn(self) -> JoinHandle<u64> {
        self.active.store(true, Ordering::SeqCst);
        tokio::spawn(async move {
            time::sleep(self.config.start_delay).await;
            poll_until_stopped(self.cycle.as_ref(), &self.run_flag, self.config.interval, &self.active).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize};

    use quizpilot_core::{MemoryStorage, QuizError, TabStorage};

    /// Counts calls; drops the flag after `stop_after`, fails on `fail_on`.
    struct ScriptedCycle {
        calls: AtomicU64,
        stop_after: u64,
        fail_on: Option<u64>,
        flag: RunFlag,
    }

    #[async_trait]
    impl QuestionCycle for ScriptedCycle {
        async fn run_cycle(&self) -> Result<CycleOutcome> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.stop_after {
                self.flag.set_running(false)?;
            }
            if self.fail_on == Some(n) {
                return Err(QuizError::Storage("quota exceeded".into()));
            }
            Ok(CycleOutcome::NotRunning)
        }
    }

    fn flag() -> RunFlag {
        let flag = RunFlag::new(Arc::new(MemoryStorage::new()));
        flag.set_running(true).unwrap();
        flag
    }

    #[tokio::test(start_paused = true)]
    async fn runs_until_flag_drops() {
        let flag = flag();
        let cycle = ScriptedCycle { calls: AtomicU64::new(0), stop_after: 4, fail_on: None, flag: flag.clone() };

        let started = time::Instant::now();
        let cycles = run_poll_loop(&cycle, &flag, Duration::from_millis(300)).await;
        assert_eq!(cycles, 4);
        assert_eq!(started.elapsed(), Duration::from_millis(1200));
    }

    #[tokio::test(start_paused = true)]
    async fn errors_do_not_stop_the_loop() {
        let flag = flag();
        let cycle = ScriptedCycle { calls: AtomicU64::new(0), stop_after: 3, fail_on: Some(1), flag: flag.clone() };
        assert_eq!(run_poll_loop(&cycle, &flag, Duration::from_millis(300)).await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cleared_flag_runs_nothing() {
        let flag = flag();
        flag.set_running(false).unwrap();
        let cycle = ScriptedCycle { calls: AtomicU64::new(0), stop_after: 1, fail_on: None, flag: flag.clone() };
        assert_eq!(run_poll_loop(&cycle, &flag, Duration::from_millis(300)).await, 0);
        assert_eq!(cycle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_loop_waits_for_start_delay() {
        let flag = flag();
        let cycle = Arc::new(ScriptedCycle {
            calls: AtomicU64::new(0),
            stop_after: 1,
            fail_on: None,
            flag: flag.clone(),
        });
        let polling = PollingLoop::new(cycle.clone(), flag, PollingConfig::default());

        let started = time::Instant::now();
        let cycles = polling.spawn().await.unwrap();
        assert_eq!(cycles, 1);
        assert_eq!(started.elapsed(), Duration::from_millis(120 + 300));
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_loop_is_inactive_once_stopped() {
        let flag = flag();
        let cycle = Arc::new(ScriptedCycle {
            calls: AtomicU64::new(0),
            stop_after: 2,
            fail_on: None,
            flag: flag.clone(),
        });
        let polling = PollingLoop::new(cycle, flag, PollingConfig::default());
        assert!(polling.try_claim());
        assert!(!polling.try_claim());

        let handle = polling.clone().spawn();
        assert!(polling.is_active());
        assert_eq!(handle.await.unwrap(), 2);
        assert!(!polling.is_active());
        assert!(polling.try_claim());
    }

    /// Run flag reads "false" first, then "true", as if a start landed
    /// between the loop's two reads. Optionally a new loop claims the slot
    /// at that moment.
    struct RestartDuringStop {
        reads: AtomicUsize,
        rival: Option<Arc<AtomicBool>>,
    }

    impl TabStorage for RestartDuringStop {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(Some("false".into()));
            }
            if let Some(active) = &self.rival {
                assert!(claim(active));
            }
            Ok(Some("true".into()))
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }
        fn remove_item(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn restart_while_stopping_keeps_the_loop() {
        let active = AtomicBool::new(true);
        let flag = RunFlag::new(Arc::new(RestartDuringStop { reads: AtomicUsize::new(0), rival: None }));
        assert!(keep_polling(&flag, &active));
        assert!(active.load(Ordering::SeqCst));
    }

    #[test]
    fn restart_claimed_by_new_loop_ends_the_old_one() {
        let active = Arc::new(AtomicBool::new(true));
        let storage = RestartDuringStop { reads: AtomicUsize::new(0), rival: Some(active.clone()) };
        let flag = RunFlag::new(Arc::new(storage));
        assert!(!keep_polling(&flag, &active));
        // the new loop owns the mark
        assert!(active.load(Ordering::SeqCst));
    }

    #[test]
    fn plain_stop_releases_the_mark() {
        let active = AtomicBool::new(true);
        let flag = RunFlag::new(Arc::new(MemoryStorage::new()));
        assert!(!keep_polling(&flag, &active));
        assert!(!active.load(Ordering::SeqCst));
    }
}
