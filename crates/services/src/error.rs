//! Shared error types for the services crate.

use thiserror::Error;

use flip_core::model::{ConfigError, QuestionIndex, SessionId, SessionSummaryError};
use flip_core::queue::QueueError;
use flip_core::session::SessionStateError;
use storage::repository::StorageError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("empty answers are not checked")]
    BlankAnswer,
    #[error("check an answer before moving to the next question")]
    NotAnswered,
    #[error("unknown session {0}")]
    UnknownSession(SessionId),
    #[error("question {0} is not in the corpus")]
    UnknownQuestion(QuestionIndex),
    #[error("session lock poisoned")]
    LockPoisoned,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    State(#[from] SessionStateError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// True when the user can fix this by changing their input or configuration.
    ///
    /// Everything else is a caller contract violation or an infrastructure fault.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionError::BlankAnswer | SessionError::Config(_) | SessionError::Queue(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_problems_are_recoverable() {
        assert!(SessionError::from(QueueError::NoEligibleQuestions).is_recoverable());
        assert!(SessionError::from(ConfigError::InvalidRandomCount).is_recoverable());
        assert!(SessionError::BlankAnswer.is_recoverable());
    }

    #[test]
    fn contract_violations_are_not() {
        assert!(!SessionError::from(SessionStateError::EmptyQueue).is_recoverable());
        assert!(!SessionError::NotAnswered.is_recoverable());
        assert!(!SessionError::UnknownSession(SessionId::new_random()).is_recoverable());
    }
}
