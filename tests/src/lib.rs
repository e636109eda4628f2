#[macro_use]
mod macros;

pub mod db;
mod db_test;
mod exec_log;
mod logging_driver;
pub mod prelude;

pub use db_test::DbTest;
pub use exec_log::ExecLog;
pub use logging_driver::{DriverOp, LoggingDriver};

use tabula::driver::{Capability, Driver};

#[async_trait::async_trait]
pub trait Setup: Send + Sync + 'static {
    /// Connects a driver to a database owned by this test.
    async fn connect(&self) -> tabula::Result<Box<dyn Driver>>;

    fn capability(&self) -> &'static Capability;

    /// Drops the database created for this test, if any.
    async fn cleanup(&self) -> tabula::Result<()> {
        Ok(())
    }
}
