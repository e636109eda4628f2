use crate::{
    driver::operation::QuerySql,
    mutation::{Mutation, Op},
    schema,
    stmt::{self, ValueRecord},
    Entity, Error, Result, Table, Value,
};

use indexmap::IndexMap;
use std::fmt;

/// Builds one row to insert.
#[derive(Debug)]
pub struct Create {
    mutation: Mutation,
}

impl Create {
    pub(crate) fn new(table: Table) -> Create {
        Create {
            mutation: Mutation::new(table, Op::Create),
        }
    }

    pub fn set_value(mut self, column: &str, value: impl Into<Value>) -> Create {
        self.mutation.set_value(column, value);
        self
    }

    pub fn add_value(mut self, column: &str, delta: i64) -> Create {
        self.mutation.add_value(column, delta);
        self
    }

    pub fn clear_value(mut self, column: &str) -> Create {
        self.mutation.clear_value(column);
        self
    }

    /// Inserts the row with an explicit id instead of a generated one.
    pub fn set_id(mut self, id: i64) -> Create {
        self.mutation.set_id(id);
        self
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    pub fn mutation_mut(&mut self) -> &mut Mutation {
        &mut self.mutation
    }

    pub async fn save(self) -> Result<Entity> {
        let table = self.mutation.table().clone();
        let mut entities = CreateBulk::new(table, vec![self]).save().await?;

        entities
            .pop()
            .ok_or_else(|| Error::invalid_result("insert returned no rows"))
    }

    pub async fn exec(self) -> Result<()> {
        self.save().await?;
        Ok(())
    }

    /// Fills declared defaults for columns the row leaves unset.
    fn defaults(&mut self) {
        let table = self.mutation.table().schema().clone();

        for column in table.fields() {
            if self.mutation.data().contains_key(&column.name)
                || self.mutation.field_cleared(&column.name)
            {
                continue;
            }

            if let Some(default) = &column.default {
                self.mutation
                    .data_mut()
                    .insert(column.name.clone(), default.clone());
            }
        }
    }

    /// Rejects rows missing a required column.
    fn check(&self) -> Result<()> {
        for column in self.mutation.table().schema().fields() {
            if !column.nullable && !self.mutation.data().contains_key(&column.name) {
                return Err(Error::validation(
                    Some(&column.name),
                    "missing required value",
                ));
            }
        }

        Ok(())
    }

    /// Whether the row writes `column`, possibly as NULL.
    fn writes(&self, column: &str) -> bool {
        self.mutation.data().contains_key(column) || self.mutation.field_cleared(column)
    }

    fn value(&self, column: &str) -> Value {
        match column {
            schema::Table::ID => self.mutation.id().map(Value::I64).unwrap_or(Value::Null),
            column => self.mutation.value(column).cloned().unwrap_or(Value::Null),
        }
    }
}

type BeforeHook = Box<dyn Fn(&mut Mutation) -> Result<()> + Send + Sync>;
type AfterHook = Box<dyn Fn(&Entity) -> Result<()> + Send + Sync>;

/// Inserts several rows with a single statement.
///
/// Either every row is inserted and receives its id, or none is.
pub struct CreateBulk {
    table: Table,
    builders: Vec<Create>,
    before_each: Vec<BeforeHook>,
    after_each: Vec<AfterHook>,
}

impl CreateBulk {
    pub(crate) fn new(table: Table, builders: Vec<Create>) -> CreateBulk {
        CreateBulk {
            table,
            builders,
            before_each: vec![],
            after_each: vec![],
        }
    }

    /// Runs `hook` on each row's mutation, in order, before the insert is
    /// built. An error aborts the whole insert.
    pub fn before_each(
        mut self,
        hook: impl Fn(&mut Mutation) -> Result<()> + Send + Sync + 'static,
    ) -> CreateBulk {
        self.before_each.push(Box::new(hook));
        self
    }

    /// Runs `hook` on each created entity, in order, after the insert.
    pub fn after_each(
        mut self,
        hook: impl Fn(&Entity) -> Result<()> + Send + Sync + 'static,
    ) -> CreateBulk {
        self.after_each.push(Box::new(hook));
        self
    }

    pub async fn exec(self) -> Result<()> {
        self.save().await?;
        Ok(())
    }

    pub async fn save(mut self) -> Result<Vec<Entity>> {
        if self.builders.is_empty() {
            return Ok(vec![]);
        }

        for builder in &mut self.builders {
            if builder.mutation.table().name() != self.table.name() {
                return Err(Error::validation(
                    None::<String>,
                    format!(
                        "cannot insert {} rows into {}",
                        builder.mutation.table().name(),
                        self.table.name()
                    ),
                ));
            }

            for hook in &self.before_each {
                hook(&mut builder.mutation)?;
            }

            builder.mutation.check()?;
            builder.defaults();
            builder.check()?;
        }

        let explicit_ids = self
            .builders
            .iter()
            .filter(|builder| builder.mutation.id().is_some())
            .count();

        if explicit_ids != 0 && explicit_ids != self.builders.len() {
            return Err(Error::validation(
                Some(schema::Table::ID),
                "cannot mix explicit and generated ids in one insert",
            ));
        }

        let explicit_ids = explicit_ids != 0;

        let mut columns = vec![];

        if explicit_ids {
            columns.push(schema::Table::ID.to_string());
        }

        for column in self.table.schema().fields() {
            if self.builders.iter().any(|builder| builder.writes(&column.name)) {
                columns.push(column.name.clone());
            }
        }

        let mut insert = stmt::Insert::new(self.table.name(), columns.clone());
        insert.rows = self
            .builders
            .iter()
            .map(|builder| columns.iter().map(|column| builder.value(column)).collect())
            .collect();

        let ids = self.insert(insert, explicit_ids).await?;

        if ids.len() != self.builders.len() {
            return Err(Error::invalid_result(format!(
                "inserted {} rows, got {} ids",
                self.builders.len(),
                ids.len()
            )));
        }

        let table = self.table.downgrade();
        let fields = columns
            .iter()
            .filter(|column| *column != schema::Table::ID)
            .collect::<Vec<_>>();

        let mut entities = Vec::with_capacity(ids.len());

        for (builder, id) in self.builders.iter().zip(ids) {
            let row = fields
                .iter()
                .map(|column| (column.to_string(), builder.value(column)))
                .collect::<IndexMap<_, _>>();

            let entity = Entity::new(table.clone(), id, row);

            for hook in &self.after_each {
                hook(&entity)?;
            }

            entities.push(entity);
        }

        Ok(entities)
    }

    /// Runs the insert and returns the id of each row, in row order.
    async fn insert(&self, mut insert: stmt::Insert, explicit_ids: bool) -> Result<Vec<i64>> {
        let client = self.table.client();

        if explicit_ids {
            let ids = self
                .builders
                .iter()
                .filter_map(|builder| builder.mutation.id())
                .collect();
            client.execute(insert).await?;
            return Ok(ids);
        }

        let rows = insert.rows.len() as u64;

        let op = if client.capability().returning {
            insert.returning_id = true;
            QuerySql::query(insert, vec![stmt::Type::I64])
        } else {
            QuerySql {
                stmt: insert.into(),
                ret: Some(vec![stmt::Type::I64]),
                last_insert_id_hack: Some(rows),
            }
        };

        client
            .exec(op.into())
            .await?
            .rows
            .into_values()?
            .iter()
            .map(generated_id)
            .collect()
    }
}

fn generated_id(row: &ValueRecord) -> Result<i64> {
    match row.first() {
        Some(Value::I64(id)) => Ok(*id),
        Some(value) => Err(Error::type_conversion(value, "i64")),
        None => Err(Error::invalid_result("insert returned an empty row")),
    }
}

impl fmt::Debug for CreateBulk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateBulk")
            .field("table", &self.table.name())
            .field("builders", &self.builders)
            .field("before_each", &self.before_each.len())
            .field("after_each", &self.after_each.len())
            .finish()
    }
}
