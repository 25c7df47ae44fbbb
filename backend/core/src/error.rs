use thiserror::Error;

/// Top-level error type for the QuizPilot runtime.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("question state is corrupt: {0}")]
    StateCorrupt(String),

    #[error("unsupported selector: {0}")]
    Selector(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for QuizError {
    fn from(err: serde_json::Error) -> Self {
        QuizError::StateCorrupt(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
