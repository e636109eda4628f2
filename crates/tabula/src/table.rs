use crate::{
    client::WeakClient, predicate, schema, Client, Create, CreateBulk, Delete, DeleteOne, Entity,
    Query, Result, Update, UpdateOne,
};

use std::sync::Arc;

/// A registered table bound to the client it was looked up on.
///
/// The handle keeps a snapshot of the table descriptor; re-registering the
/// table on the client does not affect handles already taken.
#[derive(Debug, Clone)]
pub struct Table {
    client: Client,
    schema: Arc<schema::Table>,
}

impl Table {
    pub(crate) fn new(client: Client, schema: Arc<schema::Table>) -> Table {
        Table { client, schema }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &Arc<schema::Table> {
        &self.schema
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Column names in declaration order, `id` first.
    pub fn columns(&self) -> Vec<&str> {
        self.schema.column_names()
    }

    pub fn create(&self) -> Create {
        Create::new(self.clone())
    }

    /// Inserts all `builders` with a single statement.
    pub fn create_bulk(&self, builders: impl IntoIterator<Item = Create>) -> CreateBulk {
        CreateBulk::new(self.clone(), builders.into_iter().collect())
    }

    pub fn update(&self) -> Update {
        Update::new(self.clone())
    }

    /// Updates the row `entity` was loaded from, starting from its values.
    pub fn update_one(&self, entity: &Entity) -> UpdateOne {
        UpdateOne::from_entity(self.clone(), entity)
    }

    pub fn update_one_id(&self, id: i64) -> UpdateOne {
        UpdateOne::from_id(self.clone(), id)
    }

    pub fn delete(&self) -> Delete {
        Delete::new(self.clone())
    }

    pub fn delete_one(&self, entity: &Entity) -> DeleteOne {
        DeleteOne::new(self.clone(), entity.id)
    }

    pub fn delete_one_id(&self, id: i64) -> DeleteOne {
        DeleteOne::new(self.clone(), id)
    }

    pub fn query(&self) -> Query {
        Query::new(self.clone())
    }

    /// Loads the row with the given id.
    pub async fn get(&self, id: i64) -> Result<Entity> {
        self.query().filter(predicate::id_eq(id)).only().await
    }

    pub(crate) fn downgrade(&self) -> TableRef {
        TableRef {
            client: self.client.downgrade(),
            schema: self.schema.clone(),
        }
    }
}

/// The table an entity was loaded from, without keeping its client alive.
#[derive(Clone)]
pub(crate) struct TableRef {
    client: WeakClient,
    schema: Arc<schema::Table>,
}

impl TableRef {
    pub(crate) fn upgrade(&self) -> Result<Table> {
        Ok(Table::new(self.client.upgrade()?, self.schema.clone()))
    }

    pub(crate) fn name(&self) -> &str {
        &self.schema.name
    }

    pub(crate) fn is_transactional(&self) -> bool {
        self.client.is_transactional()
    }

    pub(crate) fn without_tx(&self) -> TableRef {
        TableRef {
            client: self.client.without_tx(),
            schema: self.schema.clone(),
        }
    }
}
