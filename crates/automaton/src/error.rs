//! Error types surfaced by the automaton.
//!
//! Only [`AutomatonError::NothingToDo`] and [`AutomatonError::NoDirection`]
//! ever reach the user, as an informational message when the automaton
//! hands control back. Queue faults stay internal, and an invalid flow
//! channel is a programming error that is logged rather than raised.
use thiserror::Error;

use crate::grid::Cell;

pub type Result<T> = std::result::Result<T, AutomatonError>;

/// Recoverability class of an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// The host keeps running; the automaton may be restarted.
    Recoverable,
    /// The request itself was wrong.
    Validation,
    /// Contract violation inside the automaton.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    #[error("Could not find anything to do.")]
    NothingToDo,

    #[error("Could not work out which way to proceed.")]
    NoDirection { target: Cell },

    #[error("automaton is not active")]
    Inactive,

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    InvalidChannel(#[from] InvalidChannel),
}

impl AutomatonError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NothingToDo | Self::NoDirection { .. } => ErrorSeverity::Recoverable,
            Self::Inactive => ErrorSeverity::Validation,
            Self::Queue(err) => err.severity(),
            Self::InvalidChannel(_) => ErrorSeverity::Internal,
        }
    }

    /// True for the errors that end the automaton's activation.
    pub fn deactivates(&self) -> bool {
        matches!(self, Self::NothingToDo | Self::NoDirection { .. })
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was full; the oldest unread key has been dropped.
    #[error("key queue overflow, oldest pending key dropped")]
    Overflow,

    #[error("refusing to enqueue a nul key")]
    NullKey,
}

impl QueueError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Overflow => ErrorSeverity::Recoverable,
            Self::NullKey => ErrorSeverity::Validation,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("flow channel index {0} is not one of normal (0), combat (1), safety (2)")]
pub struct InvalidChannel(pub u8);
