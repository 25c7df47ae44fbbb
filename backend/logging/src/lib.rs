//! Structured logging for QuizPilot.
//!
//! Console and rolling NDJSON output, plus the cycle event records the
//! coordinator and loop emit on the `quiz_events` target.

pub mod event_logger;
pub mod logger;

pub use event_logger::{CycleEvent, EventLogEntry, EventLogger, EVENT_TARGET};
pub use logger::init_logger;
