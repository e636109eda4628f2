use super::Error;

#[derive(Debug)]
pub(super) enum TransactionError {
    Nested,
    Closed,
    NotInTransaction,
}

impl std::error::Error for TransactionError {}

impl core::fmt::Display for TransactionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(match self {
            TransactionError::Nested => "cannot start a transaction within a transaction",
            TransactionError::Closed => "transaction has already been committed or rolled back",
            TransactionError::NotInTransaction => "not running in a transaction",
        })
    }
}

impl Error {
    /// A transaction was requested from a client that is already transactional.
    pub fn nested_transaction() -> Error {
        Error::from(super::ErrorKind::Transaction(TransactionError::Nested))
    }

    /// The transaction backing a client has finished.
    pub fn transaction_closed() -> Error {
        Error::from(super::ErrorKind::Transaction(TransactionError::Closed))
    }

    /// A transactional handle was requested from a non-transactional client.
    pub fn not_in_transaction() -> Error {
        Error::from(super::ErrorKind::Transaction(
            TransactionError::NotInTransaction,
        ))
    }

    /// Returns `true` if this error concerns transaction lifecycle.
    pub fn is_transaction(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Transaction(_))
    }
}
