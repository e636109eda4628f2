use super::{Client, Connect, Pool, PoolConfig, Shared, Timeouts};
use crate::{driver::Driver, schema, Result};

use tabula_core::Catalog;

use std::{sync::RwLock, time::Duration};

#[derive(Debug, Default)]
pub struct Builder {
    /// Tables installed in the catalog of every client built from here
    tables: Vec<schema::Table>,

    pool: PoolConfig,

    /// Deadline applied to every dispatched statement
    statement_timeout: Option<Duration>,

    debug: bool,
}

impl Builder {
    pub fn register(&mut self, table: schema::Table) -> &mut Self {
        self.tables.push(table);
        self
    }

    /// Caps the number of pooled connections. The driver may impose a lower
    /// limit.
    pub fn max_connections(&mut self, max_connections: usize) -> &mut Self {
        self.pool.max_size = max_connections;
        self
    }

    pub fn pool_timeouts(&mut self, timeouts: Timeouts) -> &mut Self {
        self.pool.timeouts = timeouts;
        self
    }

    pub fn statement_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.statement_timeout = Some(timeout);
        self
    }

    /// Log every statement at `INFO` with its bound arguments.
    pub fn debug(&mut self, debug: bool) -> &mut Self {
        self.debug = debug;
        self
    }

    pub async fn connect(&mut self, url: &str) -> Result<Client> {
        self.build(Connect::new(url)?).await
    }

    pub async fn open(&mut self, dialect: &str, dsn: &str) -> Result<Client> {
        self.build(Connect::open(dialect, dsn)?).await
    }

    pub async fn build(&mut self, driver: impl Driver) -> Result<Client> {
        let mut catalog = Catalog::new();

        for table in &self.tables {
            catalog.register(table.clone())?;
        }

        let pool = Pool::new(Box::new(driver), self.pool.clone()).await?;

        tracing::debug!(
            dialect = %pool.capability().dialect,
            tables = catalog.len(),
            "client connected"
        );

        let shared = Shared {
            catalog: RwLock::new(catalog),
            pool,
            statement_timeout: self.statement_timeout,
        };

        Ok(Client::new(shared, self.debug))
    }
}
