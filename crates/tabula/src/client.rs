mod builder;
mod connect;
mod pool;

pub use builder::Builder;
pub use connect::Connect;
pub use pool::{Pool, PoolConfig, PoolConnection, Timeouts};

use crate::{
    driver::{Capability, Dialect, Operation, Response},
    migrate::Schema,
    schema,
    stmt::{self, ValueRecord},
    transaction::TxConnection,
    Error, Result, Table,
};

use tabula_core::{driver::operation::QuerySql, Catalog};
use tabula_sql::Serializer;

use std::{
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak},
    time::Duration,
};

/// Shared state between all `Client` clones, including transactional ones.
pub(crate) struct Shared {
    pub(crate) catalog: RwLock<Catalog>,
    pub(crate) pool: Pool,
    pub(crate) statement_timeout: Option<Duration>,
}

/// Where a client's statements run.
#[derive(Clone)]
pub(crate) enum ConnectionType {
    /// Each statement checks a connection out of the pool
    Pool,

    /// Statements run on the connection pinned by a transaction
    Transaction(Arc<TxConnection>),
}

/// A handle to a database and its runtime catalog.
///
/// Cloning is cheap; clones share the catalog and the connection pool.
#[derive(Clone)]
pub struct Client {
    pub(crate) shared: Arc<Shared>,
    pub(crate) conn: ConnectionType,
    pub(crate) debug: bool,
}

/// A non-owning client reference held by entities.
#[derive(Clone)]
pub(crate) struct WeakClient {
    shared: Weak<Shared>,
    conn: ConnectionType,
    debug: bool,
}

impl Client {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Connects using a `sqlite:`, `mysql://` or `postgres://` URL.
    pub async fn connect(url: &str) -> Result<Client> {
        Client::builder().connect(url).await
    }

    /// Connects with a dialect name (`mysql`, `postgres` or `sqlite`) and a
    /// driver-specific data source name.
    pub async fn open(dialect: &str, dsn: &str) -> Result<Client> {
        Client::builder().open(dialect, dsn).await
    }

    pub(crate) fn new(shared: Shared, debug: bool) -> Client {
        Client {
            shared: Arc::new(shared),
            conn: ConnectionType::Pool,
            debug,
        }
    }

    /// Closes the connection pool. Every client sharing it, and every
    /// entity loaded through it, fails afterwards.
    pub fn close(&self) {
        tracing::debug!("closing client");
        self.shared.pool.close();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.pool.is_closed()
    }

    /// Returns a client that logs each statement with its arguments.
    pub fn debug(&self) -> Client {
        Client {
            debug: true,
            ..self.clone()
        }
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn is_transactional(&self) -> bool {
        matches!(self.conn, ConnectionType::Transaction(_))
    }

    /// Registers `table`, replacing any table with the same name. The
    /// database is not touched; see [`Client::schema`].
    pub fn add_table(&self, table: schema::Table) -> Result<Arc<schema::Table>> {
        let table = self.catalog_mut().register(table)?;
        tracing::debug!(table = %table.name, columns = table.columns().len(), "table registered");
        Ok(table)
    }

    /// Removes `name` from the catalog without dropping it in the database.
    pub fn delete_table(&self, name: &str) -> Option<Arc<schema::Table>> {
        self.catalog_mut().unregister(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<schema::Table>> {
        self.catalog().lookup(name).cloned()
    }

    /// Returns a handle for building statements against `name`.
    pub fn table(&self, name: &str) -> Result<Table> {
        match self.lookup(name) {
            Some(schema) => Ok(Table::new(self.clone(), schema)),
            None => Err(Error::validation(
                None::<String>,
                format!("unknown table {name:?}"),
            )),
        }
    }

    /// Names of the registered tables.
    pub fn tables(&self) -> Vec<String> {
        self.catalog()
            .tables()
            .map(|table| table.name.clone())
            .collect()
    }

    /// Creates registered tables in the database.
    pub fn schema(&self) -> Schema<'_> {
        Schema::new(self)
    }

    pub fn capability(&self) -> &'static Capability {
        self.shared.pool.capability()
    }

    pub fn dialect(&self) -> Dialect {
        self.capability().dialect
    }

    pub(crate) fn downgrade(&self) -> WeakClient {
        WeakClient {
            shared: Arc::downgrade(&self.shared),
            conn: self.conn.clone(),
            debug: self.debug,
        }
    }

    fn catalog(&self) -> RwLockReadGuard<'_, Catalog> {
        self.shared
            .catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn catalog_mut(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.shared
            .catalog
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Dispatches `op` on this client's connection, subject to the
    /// statement timeout.
    pub(crate) async fn exec(&self, op: Operation) -> Result<Response> {
        self.log(&op);

        let dispatch = self.dispatch(op);

        match self.shared.statement_timeout {
            Some(timeout) => tokio::time::timeout(timeout, dispatch)
                .await
                .map_err(|_| Error::statement_timed_out(timeout))?,
            None => dispatch.await,
        }
    }

    /// Runs a query and decodes each row with `ret`.
    pub(crate) async fn query(
        &self,
        stmt: impl Into<stmt::Statement>,
        ret: Vec<stmt::Type>,
    ) -> Result<Vec<ValueRecord>> {
        self.exec(QuerySql::query(stmt, ret).into())
            .await?
            .rows
            .into_values()
    }

    /// Runs a statement and returns the number of affected rows.
    pub(crate) async fn execute(&self, stmt: impl Into<stmt::Statement>) -> Result<u64> {
        self.exec(QuerySql::exec(stmt).into())
            .await?
            .rows
            .into_count()
    }

    async fn dispatch(&self, op: Operation) -> Result<Response> {
        match &self.conn {
            ConnectionType::Pool => {
                let mut connection = self.shared.pool.get().await?;
                connection.exec(op).await
            }
            ConnectionType::Transaction(tx) => tx.exec(op).await,
        }
    }

    fn log(&self, op: &Operation) {
        let dialect = self.dialect();

        let Some(query) = op.as_query_sql() else {
            tracing::trace!(target: "tabula::exec", %dialect, op = op.name(), "operation");
            return;
        };

        if !self.debug && !tracing::enabled!(target: "tabula::exec", tracing::Level::TRACE) {
            return;
        }

        let mut params = Vec::<stmt::Value>::new();
        let sql = Serializer::for_dialect(dialect).serialize(&query.stmt.clone().into(), &mut params);

        if self.debug {
            tracing::info!(target: "tabula::exec", %dialect, sql = %sql, args = ?params, "statement");
        } else {
            tracing::trace!(target: "tabula::exec", %dialect, sql = %sql, args = params.len(), "statement");
        }
    }
}

impl WeakClient {
    pub(crate) fn upgrade(&self) -> Result<Client> {
        let shared = self.shared.upgrade().ok_or_else(Error::client_closed)?;

        Ok(Client {
            shared,
            conn: self.conn.clone(),
            debug: self.debug,
        })
    }

    pub(crate) fn is_transactional(&self) -> bool {
        matches!(self.conn, ConnectionType::Transaction(_))
    }

    pub(crate) fn without_tx(&self) -> WeakClient {
        WeakClient {
            conn: ConnectionType::Pool,
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("dialect", &self.dialect())
            .field("tables", &self.tables())
            .field("transactional", &self.is_transactional())
            .field("debug", &self.debug)
            .finish()
    }
}
