pub mod error;
pub mod hash;
pub mod outcome;
pub mod run_flag;
pub mod state;
pub mod storage;

pub use error::{QuizError, Result};
pub use hash::{question_key, rolling_hash};
pub use outcome::CycleOutcome;
pub use run_flag::{RunFlag, DEFAULT_RUN_KEY};
pub use state::{QuestionRecord, QuestionStateMap, QuestionStateStore, DEFAULT_STATE_KEY};
pub use storage::{MemoryStorage, TabStorage};
