use crate::{
    predicate::{self, Predicate},
    schema::{self, Column},
    stmt::{self, Expr},
    Client, Entity, Error, Result, Table, Value,
};

use indexmap::{IndexMap, IndexSet};
use tokio::sync::OnceCell;

/// The kind of statement a mutation turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Create,
    Update,
    UpdateOne,
    Delete,
    DeleteOne,
}

/// The pending changes of a create, update or delete builder.
///
/// Invalid changes do not fail immediately. The first one is recorded and
/// returned by the builder's `save` or `exec` before anything is sent to the
/// database.
#[derive(Debug)]
pub struct Mutation {
    table: Table,
    op: Op,
    id: Option<i64>,

    /// Values to write, keyed by column
    data: IndexMap<String, Value>,

    /// Increments for columns with no value in `data`
    added: IndexMap<String, i64>,

    /// Columns set to NULL
    cleared: IndexSet<String>,

    predicates: Vec<Predicate>,
    done: bool,
    old: Option<OldRow>,
    error: Option<Error>,
}

/// Source of the row as it was before an `UpdateOne`.
#[derive(Debug)]
enum OldRow {
    /// Row of the entity the mutation was built from
    Snapshot(IndexMap<String, Value>),

    /// Loaded from the database on first use
    Lazy(OnceCell<IndexMap<String, Value>>),
}

impl Mutation {
    pub(crate) fn new(table: Table, op: Op) -> Mutation {
        Mutation {
            table,
            op,
            id: None,
            data: IndexMap::new(),
            added: IndexMap::new(),
            cleared: IndexSet::new(),
            predicates: vec![],
            done: false,
            old: None,
            error: None,
        }
    }

    pub(crate) fn with_id(mut self, id: i64) -> Mutation {
        self.id = Some(id);
        self.old = Some(OldRow::Lazy(OnceCell::new()));
        self
    }

    pub(crate) fn with_entity(mut self, entity: &Entity) -> Mutation {
        self.id = Some(entity.id);
        self.data = entity.row.clone();
        self.old = Some(OldRow::Snapshot(entity.row.clone()));
        self
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn client(&self) -> &Client {
        self.table.client()
    }

    /// The transactional client this mutation runs on.
    pub fn tx(&self) -> Result<Client> {
        if self.client().is_transactional() {
            Ok(self.client().clone())
        } else {
            Err(Error::not_in_transaction())
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Sets the id of the targeted row, or of the row to create.
    pub fn set_id(&mut self, id: i64) -> &mut Self {
        self.id = Some(id);
        self
    }

    pub fn set_value(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        match self.field(column).and_then(|field| field.coerce(value.into())) {
            Ok(value) => {
                self.added.shift_remove(column);
                self.cleared.shift_remove(column);
                self.data.insert(column.to_string(), value);
            }
            Err(err) => self.record(err),
        }

        self
    }

    /// The value `column` will be written with, if set.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.data.get(column)
    }

    /// Columns with a value to write.
    pub fn fields(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    /// Adds `delta` to an integer column.
    ///
    /// A value already held by the mutation is incremented in place. When
    /// there is none, a create starts from zero and an update increments the
    /// stored value, treating NULL as zero.
    pub fn add_value(&mut self, column: &str, delta: i64) -> &mut Self {
        if let Err(err) = self.try_add_value(column, delta) {
            self.record(err);
        }

        self
    }

    fn try_add_value(&mut self, column: &str, delta: i64) -> Result<()> {
        let field = self.field(column)?.clone();

        if !field.ty.is_integer() {
            return Err(Error::validation(
                Some(column),
                format!("cannot add to {} column", field.ty),
            ));
        }

        let overflow = || Error::validation(Some(column), "integer overflow");

        let added = self
            .added
            .get(column)
            .copied()
            .unwrap_or(0)
            .checked_add(delta)
            .ok_or_else(overflow)?;

        let existing = match self.data.get(column) {
            Some(value) => Some(value.as_i64().unwrap_or(0)),
            None if self.op == Op::Create || self.cleared.contains(column) => Some(0),
            None => None,
        };

        if let Some(existing) = existing {
            let value = existing.checked_add(delta).ok_or_else(overflow)?;
            let value = field.coerce(Value::I64(value))?;
            self.cleared.shift_remove(column);
            self.data.insert(column.to_string(), value);
        }

        self.added.insert(column.to_string(), added);
        Ok(())
    }

    /// The total added to `column` through [`add_value`](Self::add_value).
    pub fn added_value(&self, column: &str) -> Option<i64> {
        self.added.get(column).copied()
    }

    pub fn added_fields(&self) -> Vec<&str> {
        self.added.keys().map(String::as_str).collect()
    }

    /// Sets a nullable column to NULL.
    pub fn clear_value(&mut self, column: &str) -> &mut Self {
        let nullable = self.field(column).map(|field| field.nullable);

        match nullable {
            Ok(false) => self.record(Error::validation(Some(column), "column is not nullable")),
            Ok(true) => {
                self.data.shift_remove(column);
                self.added.shift_remove(column);
                self.cleared.insert(column.to_string());
            }
            Err(err) => self.record(err),
        }

        self
    }

    pub fn field_cleared(&self, column: &str) -> bool {
        self.cleared.contains(column)
    }

    pub fn cleared_fields(&self) -> Vec<&str> {
        self.cleared.iter().map(String::as_str).collect()
    }

    /// Discards every change made to `column`.
    pub fn reset_value(&mut self, column: &str) -> &mut Self {
        self.data.shift_remove(column);
        self.added.shift_remove(column);
        self.cleared.shift_remove(column);
        self
    }

    /// Restricts the rows an update or delete applies to.
    pub fn filter(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    /// The value `column` held before this `UpdateOne`.
    ///
    /// Mutations built from an id load the row on first use, at most once,
    /// and fail once the mutation has been executed.
    pub async fn old_value(&self, column: &str) -> Result<Value> {
        if self.op != Op::UpdateOne {
            return Err(Error::validation(
                Some(column),
                "old values are only available on UpdateOne mutations",
            ));
        }

        let id = self.id.ok_or_else(missing_id)?;

        if column == schema::Table::ID {
            return Ok(Value::I64(id));
        }

        self.table.schema().resolve(column)?;

        let row = match &self.old {
            Some(OldRow::Snapshot(row)) => row,
            Some(OldRow::Lazy(cell)) => match cell.get() {
                Some(row) => row,
                None if self.done => {
                    return Err(Error::validation(
                        Some(column),
                        "querying old values post mutation is not allowed",
                    ))
                }
                None => {
                    cell.get_or_try_init(|| async {
                        Ok::<_, Error>(self.table.get(id).await?.row)
                    })
                    .await?
                }
            },
            None => return Err(missing_id()),
        };

        Ok(row.get(column).cloned().unwrap_or(Value::Null))
    }

    /// Resolves a writable column.
    fn field(&self, column: &str) -> Result<&Column> {
        if column == schema::Table::ID {
            return Err(Error::validation(
                Some(column),
                "the primary key is assigned with set_id",
            ));
        }

        self.table.schema().resolve(column)
    }

    fn record(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Returns the first invalid change, if any.
    pub(crate) fn check(&mut self) -> Result<()> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub(crate) fn done(&mut self) {
        self.done = true;
    }

    pub(crate) fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.data
    }

    /// The `WHERE` clause of an update or delete.
    pub(crate) fn filter_expr(&self) -> Result<Option<Expr>> {
        let mut operands = predicate::lower_all(&self.predicates, self.table.schema())?;

        if matches!(self.op, Op::UpdateOne | Op::DeleteOne) {
            let id = self.id.ok_or_else(missing_id)?;
            operands.insert(
                0,
                Expr::eq(Expr::column(schema::Table::ID), Value::I64(id)),
            );
        }

        Ok(match operands.is_empty() {
            true => None,
            false => Some(Expr::and_from_vec(operands)),
        })
    }

    /// The `SET` list of an update, in the order changes were made.
    pub(crate) fn assignments(&self) -> Vec<stmt::Assignment> {
        let mut assignments = Vec::with_capacity(self.data.len() + self.cleared.len());

        for (column, value) in &self.data {
            assignments.push(stmt::Assignment {
                column: column.clone(),
                expr: value.clone().into(),
            });
        }

        for (column, delta) in &self.added {
            if self.data.contains_key(column) {
                continue;
            }

            assignments.push(stmt::Assignment {
                column: column.clone(),
                expr: Expr::add(
                    Expr::coalesce([Expr::column(column), Value::I64(0).into()]),
                    Value::I64(*delta),
                ),
            });
        }

        for column in &self.cleared {
            assignments.push(stmt::Assignment {
                column: column.clone(),
                expr: Value::Null.into(),
            });
        }

        assignments
    }
}

fn missing_id() -> Error {
    Error::validation(None::<String>, "missing id in UpdateOne mutation")
}
