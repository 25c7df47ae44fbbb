//! The question coordinator: one answering attempt per call.

pub mod coordinator;
pub mod settings;

pub use coordinator::QuestionCoordinator;
pub use settings::CoordinatorSettings;
