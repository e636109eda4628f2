use super::Error;

use std::time::Duration;

#[derive(Debug)]
pub(super) struct StatementTimedOut {
    after: Duration,
}

impl std::error::Error for StatementTimedOut {}

impl core::fmt::Display for StatementTimedOut {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "statement timed out after {:?}", self.after)
    }
}

impl Error {
    /// Creates an error for a statement that did not complete before the
    /// client's deadline.
    pub fn statement_timed_out(after: Duration) -> Error {
        Error::from(super::ErrorKind::StatementTimedOut(StatementTimedOut {
            after,
        }))
    }

    /// Returns `true` if this error is a statement timeout.
    pub fn is_statement_timed_out(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::StatementTimedOut(_))
    }
}
