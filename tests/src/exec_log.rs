use crate::logging_driver::DriverOp;
use std::sync::{Arc, Mutex};
use tabula::{
    driver::{operation::Transaction, Operation, Response},
    stmt::Statement,
};

/// A wrapper around the operations log that provides a clean API for tests
pub struct ExecLog {
    ops: Arc<Mutex<Vec<DriverOp>>>,
}

impl ExecLog {
    pub(crate) fn new(ops: Arc<Mutex<Vec<DriverOp>>>) -> Self {
        Self { ops }
    }

    /// Get the number of logged operations
    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// Check if any operation matches the given predicate
    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Operation) -> bool,
    {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .any(|op| predicate(&op.operation))
    }

    /// Count operations matching the given predicate
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Operation) -> bool,
    {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| predicate(&op.operation))
            .count()
    }

    /// Number of `SELECT` statements, optionally restricted to one table
    pub fn selects(&self, table: Option<&str>) -> usize {
        self.statements(|stmt| {
            matches!(stmt, Statement::Query(_)) && table.map_or(true, |table| stmt.table() == table)
        })
    }

    pub fn inserts(&self) -> usize {
        self.statements(|stmt| matches!(stmt, Statement::Insert(_)))
    }

    pub fn updates(&self) -> usize {
        self.statements(|stmt| matches!(stmt, Statement::Update(_)))
    }

    pub fn deletes(&self) -> usize {
        self.statements(|stmt| matches!(stmt, Statement::Delete(_)))
    }

    pub fn has_commit(&self) -> bool {
        self.any(|op| matches!(op, Operation::Transaction(Transaction::Commit)))
    }

    pub fn has_rollback(&self) -> bool {
        self.any(|op| matches!(op, Operation::Transaction(Transaction::Rollback)))
    }

    fn statements<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Statement) -> bool,
    {
        self.count(|op| op.as_query_sql().is_some_and(|query| predicate(&query.stmt)))
    }

    /// Clear the log
    pub fn clear(&mut self) {
        self.ops.lock().unwrap().clear();
    }

    /// Remove and return the first operation from the log
    pub fn pop(&mut self) -> Option<(Operation, Response)> {
        let mut ops = self.ops.lock().unwrap();
        if ops.is_empty() {
            None
        } else {
            let driver_op = ops.remove(0);
            Some((driver_op.operation, driver_op.response))
        }
    }

    /// Escape hatch for custom assertions
    pub fn with_ops<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[DriverOp]) -> R,
    {
        let ops = self.ops.lock().unwrap();
        f(&ops)
    }
}
