use super::Operation;
use crate::driver::IsolationLevel;

#[derive(Debug, Clone)]
pub enum Transaction {
    /// Start a transaction
    Start {
        isolation: Option<IsolationLevel>,
        read_only: bool,
    },

    /// Commit a transaction
    Commit,

    /// Rollback a transaction
    Rollback,
}

impl Transaction {
    pub fn start() -> Self {
        Transaction::Start {
            isolation: None,
            read_only: false,
        }
    }
}

impl From<Transaction> for Operation {
    fn from(value: Transaction) -> Operation {
        Operation::Transaction(value)
    }
}
