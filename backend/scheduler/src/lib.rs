pub mod polling;

pub use polling::{run_poll_loop, PollingConfig, PollingLoop, QuestionCycle};
