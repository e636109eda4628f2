use super::Error;

/// Error when caller input does not match the catalog or an operation's
/// preconditions. Raised before any statement is dispatched.
#[derive(Debug)]
pub(super) struct ValidationError {
    field: Option<Box<str>>,
    message: Box<str>,
}

impl std::error::Error for ValidationError {}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("validation failed")?;
        if let Some(field) = &self.field {
            write!(f, " on field {:?}", field)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl Error {
    /// Creates a validation error, optionally naming the offending field.
    pub fn validation(field: Option<impl Into<String>>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Validation(ValidationError {
            field: field.map(|field| field.into().into()),
            message: message.into().into(),
        }))
    }

    /// Creates a validation error for a column name missing from a table descriptor.
    pub fn unknown_column(table: &str, column: &str) -> Error {
        Error::validation(
            Some(column),
            format!("unknown column for table {:?}", table),
        )
    }

    /// Returns `true` if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Validation(_))
    }
}
