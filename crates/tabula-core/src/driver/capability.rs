use crate::{Error, Result};

use std::{fmt, str::FromStr};

/// The SQL flavor spoken by a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Mysql,
    Postgres,
    Sqlite,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    pub fn capability(self) -> &'static Capability {
        match self {
            Dialect::Mysql => &Capability::MYSQL,
            Dialect::Postgres => &Capability::POSTGRESQL,
            Dialect::Sqlite => &Capability::SQLITE,
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mysql" => Ok(Dialect::Mysql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(Error::unsupported_feature(format!("unknown dialect {s:?}"))),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Capability {
    pub dialect: Dialect,

    /// Supports `INSERT ... RETURNING`. When false, generated ids are read
    /// with `LAST_INSERT_ID()`.
    pub returning: bool,

    /// Column storage types supported by the database
    pub storage_types: StorageTypes,
}

#[derive(Debug, PartialEq, Eq)]
pub struct StorageTypes {
    /// Length used for string columns that declare no size. `None` means
    /// strings default to an unbounded text type.
    pub default_varchar: Option<u64>,

    /// When `Some` the database supports varchar types with the specified upper
    /// limit.
    pub varchar: Option<u64>,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        dialect: Dialect::Sqlite,
        returning: true,
        storage_types: StorageTypes::SQLITE,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        dialect: Dialect::Postgres,
        storage_types: StorageTypes::POSTGRESQL,
        ..Self::SQLITE
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        dialect: Dialect::Mysql,
        returning: false,
        storage_types: StorageTypes::MYSQL,
    };
}

impl StorageTypes {
    /// SQLite storage types
    pub const SQLITE: StorageTypes = StorageTypes {
        default_varchar: None,

        // SQLite ignores the length in VARCHAR(N); the only limit is
        // SQLITE_MAX_LENGTH, one billion by default.
        varchar: Some(1_000_000_000),
    };

    pub const POSTGRESQL: StorageTypes = StorageTypes {
        default_varchar: None,
        varchar: Some(10_485_760),
    };

    pub const MYSQL: StorageTypes = StorageTypes {
        // 191 characters keeps a utf8mb4 index key within 767 bytes
        default_varchar: Some(191),
        varchar: Some(65_535),
    };
}
