use crate::{
    mutation::{Mutation, Op},
    predicate::{self, Predicate},
    stmt, Entity, Error, Result, Table, Value,
};

/// Updates every row matching its filters.
#[derive(Debug)]
pub struct Update {
    mutation: Mutation,
}

impl Update {
    pub(crate) fn new(table: Table) -> Update {
        Update {
            mutation: Mutation::new(table, Op::Update),
        }
    }

    pub fn set_value(mut self, column: &str, value: impl Into<Value>) -> Update {
        self.mutation.set_value(column, value);
        self
    }

    pub fn add_value(mut self, column: &str, delta: i64) -> Update {
        self.mutation.add_value(column, delta);
        self
    }

    pub fn clear_value(mut self, column: &str) -> Update {
        self.mutation.clear_value(column);
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Update {
        self.mutation.filter(predicate);
        self
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    pub fn mutation_mut(&mut self) -> &mut Mutation {
        &mut self.mutation
    }

    /// Returns the number of rows updated. Nothing is sent when there is
    /// nothing to change.
    pub async fn exec(mut self) -> Result<u64> {
        self.mutation.check()?;

        let Some(update) = update_stmt(&self.mutation)? else {
            return Ok(0);
        };

        let count = self.mutation.client().execute(update).await?;
        self.mutation.done();
        Ok(count)
    }
}

/// Updates a single row by id and returns it as stored afterwards.
#[derive(Debug)]
pub struct UpdateOne {
    mutation: Mutation,

    /// Columns loaded into the returned entity. Empty loads all of them.
    fields: Vec<String>,
}

impl UpdateOne {
    pub(crate) fn from_entity(table: Table, entity: &Entity) -> UpdateOne {
        UpdateOne {
            mutation: Mutation::new(table, Op::UpdateOne).with_entity(entity),
            fields: vec![],
        }
    }

    pub(crate) fn from_id(table: Table, id: i64) -> UpdateOne {
        UpdateOne {
            mutation: Mutation::new(table, Op::UpdateOne).with_id(id),
            fields: vec![],
        }
    }

    pub fn set_value(mut self, column: &str, value: impl Into<Value>) -> UpdateOne {
        self.mutation.set_value(column, value);
        self
    }

    pub fn add_value(mut self, column: &str, delta: i64) -> UpdateOne {
        self.mutation.add_value(column, delta);
        self
    }

    pub fn clear_value(mut self, column: &str) -> UpdateOne {
        self.mutation.clear_value(column);
        self
    }

    /// Adds a condition the row must also meet to be updated.
    pub fn filter(mut self, predicate: Predicate) -> UpdateOne {
        self.mutation.filter(predicate);
        self
    }

    /// Limits the columns loaded into the returned entity.
    pub fn select<I, S>(mut self, fields: I) -> UpdateOne
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    pub fn mutation_mut(&mut self) -> &mut Mutation {
        &mut self.mutation
    }

    pub async fn save(mut self) -> Result<Entity> {
        self.mutation.check()?;

        let table = self.mutation.table().clone();
        let id = self.mutation.id().ok_or_else(|| {
            Error::validation(None::<String>, "missing id in UpdateOne mutation")
        })?;

        for field in &self.fields {
            table.schema().resolve(field)?;
        }

        if let Some(update) = update_stmt(&self.mutation)? {
            let count = table.client().execute(update).await?;

            if count == 0 {
                return Err(Error::record_not_found(format!(
                    "table={} id={id}",
                    table.name()
                )));
            }
        }

        self.mutation.done();

        table
            .query()
            .filter(predicate::id_eq(id))
            .columns(self.fields)
            .only()
            .await
    }

    pub async fn exec(self) -> Result<()> {
        self.save().await?;
        Ok(())
    }
}

/// The `UPDATE` for `mutation`, or `None` when it changes nothing.
fn update_stmt(mutation: &Mutation) -> Result<Option<stmt::Update>> {
    let assignments = mutation.assignments();

    if assignments.is_empty() {
        return Ok(None);
    }

    let mut update = stmt::Update::new(mutation.table().name());
    update.assignments = assignments;
    update.filter = mutation.filter_expr()?;
    Ok(Some(update))
}
