use crate::{
    mutation::{Mutation, Op},
    predicate::Predicate,
    stmt, Error, Result, Table,
};

/// Deletes every row matching its filters. Without filters, deletes all rows.
#[derive(Debug)]
pub struct Delete {
    mutation: Mutation,
}

impl Delete {
    pub(crate) fn new(table: Table) -> Delete {
        Delete {
            mutation: Mutation::new(table, Op::Delete),
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Delete {
        self.mutation.filter(predicate);
        self
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    /// Returns the number of rows deleted.
    pub async fn exec(mut self) -> Result<u64> {
        exec(&mut self.mutation).await
    }
}

/// Deletes a single row by id.
#[derive(Debug)]
pub struct DeleteOne {
    mutation: Mutation,
}

impl DeleteOne {
    pub(crate) fn new(table: Table, id: i64) -> DeleteOne {
        let mut mutation = Mutation::new(table, Op::DeleteOne);
        mutation.set_id(id);
        DeleteOne { mutation }
    }

    pub fn filter(mut self, predicate: Predicate) -> DeleteOne {
        self.mutation.filter(predicate);
        self
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    /// Fails with a not-found error when no row was deleted.
    pub async fn exec(mut self) -> Result<()> {
        match exec(&mut self.mutation).await? {
            0 => Err(Error::record_not_found(format!(
                "table={} id={}",
                self.mutation.table().name(),
                self.mutation.id().unwrap_or_default()
            ))),
            _ => Ok(()),
        }
    }
}

async fn exec(mutation: &mut Mutation) -> Result<u64> {
    mutation.check()?;

    let mut delete = stmt::Delete::new(mutation.table().name());
    delete.filter = mutation.filter_expr()?;

    let count = mutation.client().execute(delete).await?;
    mutation.done();
    Ok(count)
}
