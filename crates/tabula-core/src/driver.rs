mod capability;
pub use capability::{Capability, Dialect, StorageTypes};

mod response;
pub use response::{Response, Rows};

pub mod operation;
pub use operation::Operation;

mod transaction;
pub use transaction::IsolationLevel;

use crate::{async_trait, Result};

use std::{borrow::Cow, fmt::Debug};

/// Creates connections to a database. Implemented by each backend.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Returns the URL this driver is connecting to.
    fn url(&self) -> Cow<'_, str>;

    /// Describes the driver's capability, which informs SQL generation.
    fn capability(&self) -> &'static Capability;

    /// Creates a new connection to the database.
    ///
    /// This method is called by the connection pool whenever a new connection
    /// is required.
    async fn connect(&self) -> Result<Box<dyn Connection>>;

    /// Returns the maximum number of simultaneous database connections
    /// supported, if the backend has a limit of its own.
    fn max_connections(&self) -> Option<usize> {
        None
    }
}

/// A single database connection.
#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// Execute a database operation
    async fn exec(&mut self, op: Operation) -> Result<Response>;
}
