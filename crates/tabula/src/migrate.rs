//! Creating the tables registered on a client.
//!
//! Only absent tables are created. Existing tables are left untouched, so the
//! drop options are accepted but never remove anything.

use crate::{
    driver::operation::{CreateTable, SetIdOffset, TableExists},
    predicate,
    schema::{self, Column, ColumnType},
    Client, Result, Table,
};

use std::sync::Arc;

/// Name of the table recording which tables own which id range.
pub const TYPES_TABLE: &str = "tabula_types";

/// Width of the id range each table owns with global unique ids.
const ID_RANGE_BITS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateOption {
    /// Give each table its own `1 << 32` id range, so ids are unique
    /// across tables.
    GlobalUniqueId(bool),
    DropColumn(bool),
    DropIndex(bool),

    /// Emit `FOREIGN KEY` clauses. Enabled by default.
    ForeignKeys(bool),
}

pub fn with_global_unique_id(enabled: bool) -> MigrateOption {
    MigrateOption::GlobalUniqueId(enabled)
}

pub fn with_drop_column(enabled: bool) -> MigrateOption {
    MigrateOption::DropColumn(enabled)
}

pub fn with_drop_index(enabled: bool) -> MigrateOption {
    MigrateOption::DropIndex(enabled)
}

pub fn with_foreign_keys(enabled: bool) -> MigrateOption {
    MigrateOption::ForeignKeys(enabled)
}

#[derive(Debug, Clone, Copy)]
struct Options {
    global_unique_id: bool,
    drop_column: bool,
    drop_index: bool,
    foreign_keys: bool,
}

impl Options {
    fn new(options: impl IntoIterator<Item = MigrateOption>) -> Options {
        let mut ret = Options {
            global_unique_id: false,
            drop_column: false,
            drop_index: false,
            foreign_keys: true,
        };

        for option in options {
            match option {
                MigrateOption::GlobalUniqueId(enabled) => ret.global_unique_id = enabled,
                MigrateOption::DropColumn(enabled) => ret.drop_column = enabled,
                MigrateOption::DropIndex(enabled) => ret.drop_index = enabled,
                MigrateOption::ForeignKeys(enabled) => ret.foreign_keys = enabled,
            }
        }

        ret
    }
}

/// Schema operations of a client, from [`Client::schema`].
#[derive(Debug)]
pub struct Schema<'a> {
    client: &'a Client,
}

impl<'a> Schema<'a> {
    pub(crate) fn new(client: &'a Client) -> Schema<'a> {
        Schema { client }
    }

    /// Creates the registered table `name` unless it already exists.
    /// Returns whether it was created.
    pub async fn create(
        &self,
        name: &str,
        options: impl IntoIterator<Item = MigrateOption>,
    ) -> Result<bool> {
        let table = self.client.table(name)?;
        self.create_table(table.schema().clone(), Options::new(options))
            .await
    }

    /// Creates every registered table that does not exist yet, in
    /// registration order. Referenced tables must be registered first when
    /// foreign keys are enabled.
    pub async fn create_all(&self, options: impl IntoIterator<Item = MigrateOption>) -> Result<()> {
        let options = Options::new(options);

        for name in self.client.tables() {
            let table = self.client.table(&name)?;
            self.create_table(table.schema().clone(), options).await?;
        }

        Ok(())
    }

    async fn create_table(&self, table: Arc<schema::Table>, options: Options) -> Result<bool> {
        if self.exists(&table.name).await? {
            tracing::debug!(table = %table.name, "table exists; skipping");
            return Ok(false);
        }

        self.client
            .exec(
                CreateTable {
                    table: table.clone(),
                    foreign_keys: options.foreign_keys,
                }
                .into(),
            )
            .await?;

        tracing::debug!(
            table = %table.name,
            foreign_keys = options.foreign_keys,
            drop_column = options.drop_column,
            drop_index = options.drop_index,
            "created table"
        );

        if options.global_unique_id {
            self.allocate_id_range(&table.name).await?;
        }

        Ok(true)
    }

    async fn exists(&self, table: &str) -> Result<bool> {
        let count = self
            .client
            .exec(
                TableExists {
                    table: table.to_string(),
                }
                .into(),
            )
            .await?
            .rows
            .into_count()?;

        Ok(count > 0)
    }

    /// Records `table` in the types table and moves its id sequence to the
    /// start of the range matching its position there.
    async fn allocate_id_range(&self, table: &str) -> Result<()> {
        let types = self.types_table().await?;

        let id = match types
            .query()
            .filter(predicate::string_eq("type", table))
            .only_id()
            .await
        {
            Ok(id) => id,
            Err(err) if err.is_record_not_found() => {
                types.create().set_value("type", table).save().await?.id
            }
            Err(err) => return Err(err),
        };

        // Registry ids start at 1; the first table keeps the default range.
        let offset = u64::try_from(id - 1).unwrap_or_default() << ID_RANGE_BITS;

        if offset > 0 {
            self.client
                .exec(
                    SetIdOffset {
                        table: table.to_string(),
                        offset,
                    }
                    .into(),
                )
                .await?;
        }

        tracing::debug!(table, offset, "allocated id range");
        Ok(())
    }

    /// A handle on the types table, created when missing. The table is not
    /// registered on the client.
    async fn types_table(&self) -> Result<Table> {
        let schema = Arc::new(types_schema()?);

        if !self.exists(TYPES_TABLE).await? {
            self.client
                .exec(
                    CreateTable {
                        table: schema.clone(),
                        foreign_keys: false,
                    }
                    .into(),
                )
                .await?;
        }

        Ok(Table::new(self.client.clone(), schema))
    }
}

fn types_schema() -> Result<schema::Table> {
    schema::Table::with_columns(
        TYPES_TABLE,
        [Column::new("type", ColumnType::String).size(255).unique()],
    )
}
