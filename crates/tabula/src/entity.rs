use crate::{
    schema, stmt::ValueRecord, table::TableRef, DeleteOne, Error, Result, UpdateOne, Value,
};

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// One materialized row.
///
/// The `id` column is promoted out of `row`. Related rows fetched by eager
/// loading are stored in `edges`.
#[derive(Clone, Serialize)]
pub struct Entity {
    #[serde(skip)]
    table: TableRef,

    /// Primary key, `0` until assigned by the database
    pub id: i64,

    /// Column values keyed by column name, in selection order
    pub row: IndexMap<String, Value>,

    pub edges: Edges,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Edges {
    /// To-one relations, keyed by store key
    pub single: IndexMap<String, Entity>,

    /// To-many relations, keyed by store key
    pub list: IndexMap<String, Vec<Entity>>,
}

impl Entity {
    pub(crate) fn new(table: TableRef, id: i64, row: IndexMap<String, Value>) -> Entity {
        Entity {
            table,
            id,
            row,
            edges: Edges::default(),
        }
    }

    /// Decodes a result row whose columns are `columns`.
    pub(crate) fn from_record(
        table: TableRef,
        columns: &[String],
        record: ValueRecord,
    ) -> Result<Entity> {
        let mut id = 0;
        let mut row = IndexMap::with_capacity(columns.len());

        for (column, value) in columns.iter().zip(record.into_vec()) {
            if column == schema::Table::ID {
                id = value.as_i64().ok_or_else(|| {
                    Error::invalid_result(format!(
                        "expected integer id, got {}",
                        value.kind_name()
                    ))
                })?;
            } else {
                row.insert(column.clone(), value);
            }
        }

        Ok(Entity::new(table, id, row))
    }

    pub fn table(&self) -> &str {
        self.table.name()
    }

    /// The value of `column`, if it was selected.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.row.get(column)
    }

    /// The related row eager loaded under `key`.
    pub fn single(&self, key: &str) -> Option<&Entity> {
        self.edges.single.get(key)
    }

    /// The related rows eager loaded under `key`.
    pub fn list(&self, key: &str) -> &[Entity] {
        self.edges.list.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Starts an update of this row, seeded with its current values.
    pub fn update(&self) -> Result<UpdateOne> {
        Ok(self.table.upgrade()?.update_one(self))
    }

    pub fn delete(&self) -> Result<DeleteOne> {
        Ok(self.table.upgrade()?.delete_one(self))
    }

    /// Whether the entity was loaded inside a transaction.
    pub fn is_transactional(&self) -> bool {
        self.table.is_transactional()
    }

    /// Re-points an entity loaded inside a transaction, and its edges, at
    /// the client the transaction was started from. Use this to keep working
    /// with the entity after commit or rollback.
    pub fn unwrap_tx(mut self) -> Result<Entity> {
        if !self.is_transactional() {
            return Err(Error::not_in_transaction());
        }

        self.detach();
        Ok(self)
    }

    fn detach(&mut self) {
        self.table = self.table.without_tx();

        for entity in self.edges.single.values_mut() {
            entity.detach();
        }

        for entity in self.edges.list.values_mut().flatten() {
            entity.detach();
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("table", &self.table())
            .field("id", &self.id)
            .field("row", &self.row)
            .field("edges", &self.edges)
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(id={}", self.table(), self.id)?;

        for (column, value) in &self.row {
            write!(f, ", {column}={value}")?;
        }

        f.write_str(")")
    }
}
