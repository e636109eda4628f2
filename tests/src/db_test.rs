use crate::{
    logging_driver::{DriverOp, LoggingDriver},
    ExecLog, Setup,
};
use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, Once},
};
use tabula::{driver::Capability, schema, Client};
use tracing_subscriber::EnvFilter;

/// Runs one test against one backend.
///
/// Owns a current-thread runtime so the per-test database is always dropped,
/// even when the test panics. Every operation the client dispatches is
/// recorded and available through [`DbTest::log`].
pub struct DbTest {
    runtime: Option<tokio::runtime::Runtime>,
    setup: Option<Box<dyn Setup>>,
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
}

impl DbTest {
    pub fn new(setup: Box<dyn Setup>) -> Self {
        init_tracing();

        Self {
            runtime: Some(new_runtime()),
            setup: Some(setup),
            ops_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Connects a client with `tables` registered and creates them.
    pub async fn try_setup_db(
        &mut self,
        tables: impl IntoIterator<Item = schema::Table>,
    ) -> tabula::Result<Client> {
        let setup = self.setup.as_ref().expect("Setup already consumed");

        let driver = LoggingDriver::new(setup.connect().await?);
        self.ops_log = driver.ops_log_handle();

        let mut builder = Client::builder();

        for table in tables {
            builder.register(table);
        }

        let client = builder.build(driver).await?;
        client.schema().create_all([]).await?;

        // Only log what the test itself does
        self.ops_log.lock().unwrap().clear();

        Ok(client)
    }

    pub async fn setup_db(&mut self, tables: impl IntoIterator<Item = schema::Table>) -> Client {
        self.try_setup_db(tables).await.unwrap()
    }

    /// The operations dispatched since setup
    pub fn log(&self) -> ExecLog {
        ExecLog::new(self.ops_log.clone())
    }

    pub fn capability(&self) -> &'static Capability {
        self.setup
            .as_ref()
            .expect("Setup already consumed")
            .capability()
    }

    /// Run a test function with a mutable reference to self, using our managed runtime.
    pub fn run_test<F>(&mut self, test_fn: F)
    where
        F: for<'a> FnOnce(&'a mut DbTest) -> Pin<Box<dyn Future<Output = ()> + 'a>>,
    {
        let runtime = self.runtime.take().expect("test already running");
        runtime.block_on(test_fn(self));
        self.runtime = Some(runtime);
    }
}

impl Drop for DbTest {
    fn drop(&mut self) {
        if let Some(setup) = self.setup.take() {
            // A panicking test leaves no runtime behind
            let runtime = self.runtime.take().unwrap_or_else(new_runtime);

            runtime.block_on(async {
                let _ = setup.cleanup().await;
            });
        }
    }
}

fn new_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime")
}

/// Honors `RUST_LOG`, writing through the test harness capture.
fn init_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
