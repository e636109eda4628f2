use super::Error;

/// An integrity violation reported by the database (unique, foreign key, not
/// null or check constraint).
#[derive(Debug)]
pub(super) struct ConstraintError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for ConstraintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "constraint violation: {}", self.inner)
    }
}

impl Error {
    /// Wraps a driver error that the driver classified as an integrity violation.
    pub fn constraint(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::Constraint(ConstraintError {
            inner: Box::new(err),
        }))
    }

    /// Returns `true` if this error is a constraint violation.
    pub fn is_constraint(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Constraint(_))
    }
}
