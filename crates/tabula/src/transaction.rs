use crate::{
    client::{Client, ConnectionType, PoolConnection},
    driver::{operation, IsolationLevel, Operation, Response},
    Error, Result,
};

use std::{ops::Deref, sync::Arc};
use tokio::sync::Mutex;

/// Options for [`Client::begin_tx`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TxOptions {
    pub isolation: Option<IsolationLevel>,
    pub read_only: bool,
}

impl TxOptions {
    pub fn isolation(mut self, level: IsolationLevel) -> Self {
        self.isolation = Some(level);
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// The pooled connection a transaction is pinned to. `None` once the
/// transaction has been committed or rolled back.
pub(crate) struct TxConnection {
    connection: Mutex<Option<PoolConnection>>,
}

impl TxConnection {
    pub(crate) async fn exec(&self, op: Operation) -> Result<Response> {
        let mut connection = self.connection.lock().await;

        match connection.as_mut() {
            Some(connection) => connection.exec(op).await,
            None => Err(Error::transaction_closed()),
        }
    }

    /// Runs the final statement of the transaction and releases the
    /// connection back to the pool.
    async fn finish(&self, op: operation::Transaction) -> Result<()> {
        let mut connection = self
            .connection
            .lock()
            .await
            .take()
            .ok_or_else(Error::transaction_closed)?;

        connection.exec(op.into()).await?;
        Ok(())
    }
}

/// An active database transaction.
///
/// Dereferences to a [`Client`] whose statements all run on the
/// transaction's connection. If dropped without calling
/// [`commit`](Self::commit) or [`rollback`](Self::rollback), the
/// transaction is rolled back.
pub struct Tx {
    client: Client,
    connection: Arc<TxConnection>,

    /// Whether commit or rollback has been called.
    finished: bool,
}

impl Client {
    /// Begins a transaction with the database defaults.
    pub async fn tx(&self) -> Result<Tx> {
        self.begin_tx(TxOptions::default()).await
    }

    /// Begins a transaction. Fails if this client is already transactional.
    pub async fn begin_tx(&self, options: TxOptions) -> Result<Tx> {
        if self.is_transactional() {
            return Err(Error::nested_transaction());
        }

        let mut connection = self.shared.pool.get().await?;

        connection
            .exec(
                operation::Transaction::Start {
                    isolation: options.isolation,
                    read_only: options.read_only,
                }
                .into(),
            )
            .await?;

        tracing::debug!(
            isolation = ?options.isolation,
            read_only = options.read_only,
            "transaction started"
        );

        let connection = Arc::new(TxConnection {
            connection: Mutex::new(Some(connection)),
        });

        let client = Client {
            shared: self.shared.clone(),
            conn: ConnectionType::Transaction(connection.clone()),
            debug: self.is_debug(),
        };

        Ok(Tx {
            client,
            connection,
            finished: false,
        })
    }
}

impl Tx {
    /// The transactional client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Commits the transaction.
    pub async fn commit(mut self) -> Result<()> {
        self.finished = true;
        self.connection
            .finish(operation::Transaction::Commit)
            .await?;
        tracing::debug!("transaction committed");
        Ok(())
    }

    /// Rolls back the transaction.
    pub async fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.connection
            .finish(operation::Transaction::Rollback)
            .await?;
        tracing::debug!("transaction rolled back");
        Ok(())
    }
}

impl Deref for Tx {
    type Target = Client;

    fn deref(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for Tx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tx")
            .field("client", &self.client)
            .field("finished", &self.finished)
            .finish()
    }
}

impl Drop for Tx {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        // Without a runtime the pinned connection is dropped, which closes
        // it and lets the database discard the transaction.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let connection = self.connection.clone();
        handle.spawn(async move {
            if connection
                .finish(operation::Transaction::Rollback)
                .await
                .is_ok()
            {
                tracing::debug!("transaction rolled back on drop");
            }
        });
    }
}
