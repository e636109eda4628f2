use super::{Column, Table};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::sync::Arc;

/// Registry of runtime table descriptors, keyed by table name.
///
/// Descriptors are stored as `Arc` snapshots. Replacing a table hands out a
/// new snapshot; holders of the previous one are unaffected.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    tables: IndexMap<String, Arc<Table>>,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog::default()
    }

    /// Installs `table`, replacing any table with the same name.
    pub fn register(&mut self, table: Table) -> Result<Arc<Table>> {
        if table.name.is_empty() {
            return Err(Error::validation(None::<String>, "table name must not be empty"));
        }

        let table = Arc::new(table);
        self.tables.insert(table.name.clone(), table.clone());
        Ok(table)
    }

    /// Removes the table from the catalog. The database is not touched.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<Table>> {
        self.tables.shift_remove(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<Table>> {
        self.tables.get(name)
    }

    pub fn column(&self, table: &str, name: &str) -> Option<&Column> {
        self.lookup(table)?.column(name)
    }

    pub fn has_column(&self, table: &str, name: &str) -> bool {
        self.column(table, name).is_some()
    }

    /// Column names of `table` in declaration order.
    pub fn columns(&self, table: &str) -> Option<Vec<&str>> {
        self.lookup(table).map(|table| table.column_names())
    }

    pub fn tables(&self) -> impl ExactSizeIterator<Item = &Arc<Table>> + '_ {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
