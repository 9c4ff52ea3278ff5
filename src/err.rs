//! Errors returned by the queue operations.

use std::error::Error;
use std::fmt;

/// Error returned by a push on a closed queue.
///
/// Carries the rejected item, so ownership returns to the caller instead of
/// being silently lost.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct PushError<T>(pub T);

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PushError(..)")
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "pushing into a closed queue")
    }
}

impl<T> Error for PushError<T> {}

/// Error returned by a blocking pop.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PopError {
    /// The queue was already closed when the call began.
    Closed,

    /// The queue was closed while this call was blocked.
    Cancelled,
}

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PopError::Closed => write!(f, "popping from a closed queue"),
            PopError::Cancelled => write!(f, "pop cancelled by queue shutdown"),
        }
    }
}

impl Error for PopError {}

/// Error returned by a non-blocking pop.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryPopError {
    /// No item was claimable. The store was either empty, or every stored
    /// item was already earmarked for a consumer blocked ahead of the
    /// caller. This is a normal outcome, not a fault.
    Empty,

    /// The queue was closed.
    Closed,
}

impl fmt::Display for TryPopError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TryPopError::Empty => write!(f, "popping from an empty queue"),
            TryPopError::Closed => write!(f, "popping from a closed queue"),
        }
    }
}

impl Error for TryPopError {}
