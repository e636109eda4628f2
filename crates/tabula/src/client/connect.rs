use crate::Result;

use std::borrow::Cow;
use tabula_core::{
    async_trait,
    driver::{Capability, Connection, Dialect, Driver},
    Error,
};
use url::Url;

/// A driver chosen at runtime from a connection URL or a `(dialect, dsn)`
/// pair. Each backend is only available when its cargo feature is enabled.
#[derive(Debug)]
pub struct Connect {
    driver: Box<dyn Driver>,
}

impl Connect {
    /// Selects the driver from the URL scheme: `sqlite:`, `mysql://`,
    /// `postgres://` or `postgresql://`.
    pub fn new(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url}")))?;

        let driver = match parsed.scheme() {
            "mysql" => connect_mysql(url)?,
            "postgres" | "postgresql" => connect_postgresql(url)?,
            "sqlite" => connect_sqlite(url)?,
            scheme => {
                return Err(Error::invalid_connection_url(format!(
                    "unsupported database; scheme={scheme}; url={url}"
                )))
            }
        };

        Ok(Self { driver })
    }

    /// Selects the driver from a dialect name and a driver-specific data
    /// source name.
    ///
    /// * `sqlite`: a file path, `:memory:`, `file:` path or `sqlite:` URL
    /// * `mysql`: a `mysql://` URL or a `user:pass@tcp(host:port)/db` DSN
    /// * `postgres`: a `postgres://` URL or a `host=... dbname=...` string
    pub fn open(dialect: &str, dsn: &str) -> Result<Self> {
        let driver = match dialect.parse::<Dialect>()? {
            Dialect::Sqlite if dsn.starts_with("sqlite:") => connect_sqlite(dsn)?,
            Dialect::Sqlite => open_sqlite(sqlite_path(dsn))?,
            Dialect::Mysql => connect_mysql(&mysql_url(dsn)?)?,
            Dialect::Postgres if dsn.contains("://") => connect_postgresql(dsn)?,
            Dialect::Postgres => open_postgresql(dsn)?,
        };

        Ok(Self { driver })
    }
}

#[async_trait]
impl Driver for Connect {
    fn url(&self) -> Cow<'_, str> {
        self.driver.url()
    }

    fn capability(&self) -> &'static Capability {
        self.driver.capability()
    }

    async fn connect(&self) -> Result<Box<dyn Connection>> {
        self.driver.connect().await
    }

    fn max_connections(&self) -> Option<usize> {
        self.driver.max_connections()
    }
}

/// Strips `file:` and query parameters from a SQLite DSN. `None` selects an
/// in-memory database.
fn sqlite_path(dsn: &str) -> Option<&str> {
    let path = dsn.strip_prefix("file:").unwrap_or(dsn);
    let path = path.split_once('?').map_or(path, |(path, _)| path);

    match path {
        "" | ":memory:" => None,
        path => Some(path),
    }
}

/// Rewrites a `[user[:password]@][tcp[(host[:port])]]/dbname[?params]` DSN as a
/// `mysql://` URL. Query parameters are driver-specific and are dropped.
fn mysql_url(dsn: &str) -> Result<String> {
    if dsn.starts_with("mysql://") {
        return Ok(dsn.to_string());
    }

    let invalid = |reason: &str| Error::invalid_connection_url(format!("{reason}; dsn={dsn}"));

    let slash = dsn.rfind('/').ok_or_else(|| invalid("missing database name"))?;
    let (head, tail) = dsn.split_at(slash);

    let (credentials, address) = match head.rfind('@') {
        Some(at) => (Some(&head[..at]), &head[at + 1..]),
        None => (None, head),
    };

    let address = match address.find('(') {
        Some(open) => {
            if &address[..open] != "tcp" {
                return Err(invalid("only the `tcp` protocol is supported"));
            }
            address[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| invalid("unterminated address"))?
        }
        None if address == "tcp" => "",
        None => address,
    };

    let (database, params) = match tail[1..].split_once('?') {
        Some((database, params)) => (database, Some(params)),
        None => (&tail[1..], None),
    };

    if database.is_empty() {
        return Err(invalid("missing database name"));
    }

    if let Some(params) = params {
        tracing::debug!(params, "ignoring MySQL DSN parameters");
    }

    let mut url = Url::parse("mysql://localhost:3306").map_err(|err| invalid(&err.to_string()))?;

    if !address.is_empty() {
        let (host, port) = match address.rsplit_once(':') {
            Some((host, port)) if !port.ends_with(']') => {
                let port = port.parse::<u16>().map_err(|_| invalid("invalid port"))?;
                (host, Some(port))
            }
            _ => (address, None),
        };

        url.set_host(Some(host))
            .map_err(|err| invalid(&err.to_string()))?;
        url.set_port(Some(port.unwrap_or(3306)))
            .map_err(|_| invalid("invalid port"))?;
    }

    if let Some(credentials) = credentials {
        let (user, password) = match credentials.split_once(':') {
            Some((user, password)) => (user, Some(password)),
            None => (credentials, None),
        };

        url.set_username(user).map_err(|_| invalid("invalid user"))?;
        url.set_password(password)
            .map_err(|_| invalid("invalid password"))?;
    }

    url.set_path(database);
    Ok(url.into())
}

#[cfg(feature = "mysql")]
fn connect_mysql(url: &str) -> Result<Box<dyn Driver>> {
    Ok(Box::new(tabula_driver_mysql::MySQL::new(url)?))
}

#[cfg(not(feature = "mysql"))]
fn connect_mysql(_url: &str) -> Result<Box<dyn Driver>> {
    Err(anyhow::anyhow!("`mysql` feature not enabled").into())
}

#[cfg(feature = "postgresql")]
fn connect_postgresql(url: &str) -> Result<Box<dyn Driver>> {
    Ok(Box::new(tabula_driver_postgresql::PostgreSQL::new(url)?))
}

#[cfg(not(feature = "postgresql"))]
fn connect_postgresql(_url: &str) -> Result<Box<dyn Driver>> {
    Err(anyhow::anyhow!("`postgresql` feature not enabled").into())
}

#[cfg(feature = "postgresql")]
fn open_postgresql(dsn: &str) -> Result<Box<dyn Driver>> {
    Ok(Box::new(tabula_driver_postgresql::PostgreSQL::from_dsn(dsn)?))
}

#[cfg(not(feature = "postgresql"))]
fn open_postgresql(_dsn: &str) -> Result<Box<dyn Driver>> {
    Err(anyhow::anyhow!("`postgresql` feature not enabled").into())
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(url: &str) -> Result<Box<dyn Driver>> {
    Ok(Box::new(tabula_driver_sqlite::Sqlite::new(url)?))
}

#[cfg(not(feature = "sqlite"))]
fn connect_sqlite(_url: &str) -> Result<Box<dyn Driver>> {
    Err(anyhow::anyhow!("`sqlite` feature not enabled").into())
}

#[cfg(feature = "sqlite")]
fn open_sqlite(path: Option<&str>) -> Result<Box<dyn Driver>> {
    use tabula_driver_sqlite::Sqlite;

    Ok(Box::new(match path {
        Some(path) => Sqlite::open(path),
        None => Sqlite::in_memory(),
    }))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_path: Option<&str>) -> Result<Box<dyn Driver>> {
    Err(anyhow::anyhow!("`sqlite` feature not enabled").into())
}
