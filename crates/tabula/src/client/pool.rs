//! Connection pooling for database connections.

use std::ops::{Deref, DerefMut};

pub use deadpool::managed::Timeouts;
use tabula_core::{
    driver::{Capability, Connection, Driver},
    Error,
};

/// Get the default maximum size of a pool, which is `cpu_core_count * 2`
/// including logical cores (Hyper-Threading).
fn get_default_pool_max_size() -> usize {
    deadpool::managed::PoolConfig::default().max_size
}

/// Configuration for connection pool behavior.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_size: usize,
    pub timeouts: Timeouts,
}

impl PoolConfig {
    /// Creates a new pool configuration with default settings.
    pub fn new() -> Self {
        Self {
            max_size: get_default_pool_max_size(),
            timeouts: Default::default(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A connection pool that manages database connections.
#[derive(Debug)]
pub struct Pool {
    inner: deadpool::managed::Pool<Manager>,
    capability: &'static Capability,
}

impl Pool {
    /// Creates a new connection pool from the given driver.
    ///
    /// One connection is opened eagerly so that unreachable databases fail
    /// here rather than on first use. The connection is kept idle in the pool.
    pub async fn new(driver: Box<dyn Driver>, config: PoolConfig) -> crate::Result<Self> {
        let capability = driver.capability();

        let max_size = match driver.max_connections() {
            Some(max_connections) => config.max_size.min(max_connections),
            None => config.max_size,
        };

        let inner = deadpool::managed::Pool::builder(Manager { driver })
            .runtime(deadpool::Runtime::Tokio1)
            .max_size(max_size.max(1))
            .timeouts(config.timeouts)
            .build()
            .map_err(Error::connection_pool)?;

        let connection = inner.get().await.map_err(pool_error)?;
        drop(connection);

        Ok(Self { inner, capability })
    }

    /// Retrieves a connection from the pool.
    pub async fn get(&self) -> crate::Result<PoolConnection> {
        if self.inner.is_closed() {
            return Err(Error::client_closed());
        }

        let connection = self.inner.get().await.map_err(pool_error)?;
        Ok(PoolConnection { inner: connection })
    }

    /// Closes the pool. Idle connections are dropped and every later `get`
    /// fails; connections currently checked out are dropped when returned.
    pub fn close(&self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Returns the database driver's capabilities.
    pub fn capability(&self) -> &'static Capability {
        self.capability
    }

    pub fn driver(&self) -> &dyn Driver {
        &*self.inner.manager().driver
    }
}

/// Driver failures while opening a connection keep their own classification.
fn pool_error(err: deadpool::managed::PoolError<Error>) -> Error {
    use deadpool::managed::PoolError;

    match err {
        PoolError::Backend(err) => err,
        PoolError::Closed => Error::client_closed(),
        err => Error::connection_pool(err),
    }
}

#[derive(Debug)]
struct Manager {
    driver: Box<dyn Driver>,
}

impl deadpool::managed::Manager for Manager {
    type Type = Box<dyn Connection>;
    type Error = crate::Error;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        tracing::debug!(url = %self.driver.url(), "opening database connection");
        self.driver.connect().await
    }

    async fn recycle(
        &self,
        _obj: &mut Self::Type,
        _metrics: &deadpool::managed::Metrics,
    ) -> deadpool::managed::RecycleResult<Self::Error> {
        Ok(())
    }
}

/// A connection retrieved from a pool.
///
/// When dropped, the connection is returned to the pool for reuse.
#[derive(Debug)]
pub struct PoolConnection {
    inner: deadpool::managed::Object<Manager>,
}

impl Deref for PoolConnection {
    type Target = Box<dyn Connection>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PoolConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
