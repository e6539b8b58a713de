//! Error types for quiz operations.

use thiserror::Error;

/// Errors raised when a request cannot be evaluated by the gate.
///
/// These never mutate session state. Callers turn them into a user-facing
/// failure response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// Question id outside the bank's range.
    #[error("question {0} does not exist")]
    InvalidQuestion(i64),

    /// Answer was empty once surrounding whitespace was removed.
    #[error("answer is empty")]
    EmptyAnswer,
}

/// Result alias for quiz operations.
pub type Result<T> = std::result::Result<T, QuizError>;
