use super::Error;

/// Error from the connection pool, or from using a client after it was closed.
#[derive(Debug)]
pub(super) enum ConnectionPoolError {
    Pool(Box<dyn std::error::Error + Send + Sync>),
    Closed,
}

impl std::error::Error for ConnectionPoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectionPoolError::Pool(inner) => Some(inner.as_ref()),
            ConnectionPoolError::Closed => None,
        }
    }
}

impl core::fmt::Display for ConnectionPoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            ConnectionPoolError::Pool(inner) => {
                // Display the error and walk its source chain
                core::fmt::Display::fmt(inner, f)?;
                let mut source = inner.source();
                while let Some(err) = source {
                    write!(f, ": {}", err)?;
                    source = err.source();
                }
                Ok(())
            }
            ConnectionPoolError::Closed => f.write_str("client is closed"),
        }
    }
}

impl Error {
    /// Creates an error from a connection pool error.
    ///
    /// This is used for errors that occur when managing the connection pool (e.g., deadpool errors).
    pub fn connection_pool(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::ConnectionPool(ConnectionPoolError::Pool(
            Box::new(err),
        )))
    }

    /// Creates an error for operations issued through a closed or dropped client.
    pub fn client_closed() -> Error {
        Error::from(super::ErrorKind::ConnectionPool(ConnectionPoolError::Closed))
    }

    /// Returns `true` if this error came from the connection pool.
    pub fn is_connection_pool(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ConnectionPool(_))
    }
}
