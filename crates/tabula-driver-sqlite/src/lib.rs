mod value;
pub(crate) use value::Value;

use rusqlite::{Connection as RusqliteConnection, ErrorCode};
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};
use tabula_core::{
    async_trait,
    driver::{
        operation::{CreateTable, Operation, QuerySql, Transaction},
        Capability, Driver, IsolationLevel, Response,
    },
    stmt, Error, Result,
};
use tabula_sql as sql;
use url::Url;

#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver)?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

#[async_trait]
impl Driver for Sqlite {
    fn url(&self) -> Cow<'_, str> {
        match self {
            Sqlite::InMemory => Cow::Borrowed("sqlite::memory:"),
            Sqlite::File(path) => Cow::Owned(format!("sqlite:{}", path.display())),
        }
    }

    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn connect(&self) -> Result<Box<dyn tabula_core::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::in_memory()?,
        };
        Ok(Box::new(connection))
    }

    /// Every in-memory connection is a separate database.
    fn max_connections(&self) -> Option<usize> {
        matches!(self, Self::InMemory).then_some(1)
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection = RusqliteConnection::open_in_memory().map_err(Error::driver)?;
        Self::init(connection)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver)?;
        Self::init(connection)
    }

    fn init(connection: RusqliteConnection) -> Result<Self> {
        // Foreign key enforcement is off by default and set per connection
        connection
            .execute_batch("PRAGMA foreign_keys = ON")
            .map_err(Error::driver)?;
        Ok(Self { connection })
    }

    fn execute(&self, sql: &str) -> Result<()> {
        tracing::trace!(sql, "sqlite execute");
        self.connection.execute(sql, []).map_err(classify)?;
        Ok(())
    }

    fn transaction(&mut self, op: Transaction) -> Result<Response> {
        if let Transaction::Start {
            isolation: Some(level),
            ..
        } = &op
        {
            if *level != IsolationLevel::Serializable {
                return Err(Error::unsupported_feature(format!(
                    "SQLite only supports serializable transactions; requested {}",
                    level.sql_name()
                )));
            }
        }

        let sql = sql::Serializer::sqlite().serialize_transaction(&op);
        self.execute(&sql)?;
        Ok(Response::count(0))
    }

    fn create_table(&mut self, op: CreateTable) -> Result<Response> {
        let serializer = sql::Serializer::sqlite();
        let mut params = Vec::<stmt::Value>::new();

        let create = sql::Statement::create_table(&op.table, op.foreign_keys);
        let sql = serializer.serialize(&create, &mut params);
        self.execute(&sql)?;

        for index in &op.table.indexes {
            let sql = serializer.serialize(
                &sql::Statement::create_index(&op.table.name, index),
                &mut params,
            );
            self.execute(&sql)?;
        }

        Ok(Response::count(0))
    }

    fn query(&mut self, stmt: sql::Statement, ret: Option<Vec<stmt::Type>>) -> Result<Response> {
        let mut params: Vec<stmt::Value> = vec![];
        let sql_str = sql::Serializer::sqlite().serialize(&stmt, &mut params);

        tracing::trace!(sql = %sql_str, params = params.len(), "sqlite query");

        let mut prepared = self
            .connection
            .prepare_cached(&sql_str)
            .map_err(classify)?;

        let params = params.into_iter().map(Value::from).collect::<Vec<_>>();

        let Some(ret) = ret else {
            let count = prepared
                .execute(rusqlite::params_from_iter(params.iter()))
                .map_err(classify)?;

            return Ok(Response::count(count as u64));
        };

        let mut rows = prepared
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(classify)?;

        let mut records = vec![];

        while let Some(row) = rows.next().map_err(classify)? {
            let mut items = Vec::with_capacity(ret.len());

            for (index, ty) in ret.iter().enumerate() {
                items.push(Value::from_sql(row, index, *ty)?.into_inner());
            }

            records.push(stmt::ValueRecord::from_vec(items));
        }

        Ok(Response::values(records))
    }
}

#[async_trait]
impl tabula_core::driver::Connection for Connection {
    async fn exec(&mut self, op: Operation) -> Result<Response> {
        match op {
            Operation::QuerySql(QuerySql {
                stmt,
                ret,
                last_insert_id_hack,
            }) => {
                if last_insert_id_hack.is_some() {
                    return Err(Error::unsupported_feature(
                        "last_insert_id_hack is MySQL-specific",
                    ));
                }
                self.query(stmt.into(), ret)
            }
            Operation::Transaction(op) => self.transaction(op),
            Operation::CreateTable(op) => self.create_table(op),
            Operation::TableExists(op) => {
                let stmt = sql::Statement::table_exists(op.table);
                let rows = self
                    .query(stmt, Some(vec![stmt::Type::I64]))?
                    .rows
                    .into_values()?;
                let exists = rows
                    .first()
                    .and_then(|row| row.first())
                    .and_then(|count| count.as_i64())
                    .is_some_and(|count| count > 0);
                Ok(Response::count(exists as u64))
            }
            Operation::SetIdOffset(op) => {
                let stmt = sql::Statement::set_id_offset(op.table, op.offset);
                self.query(stmt, None)
            }
        }
    }
}

/// Maps constraint failures to [`Error::constraint`]; everything else is a
/// driver error.
fn classify(err: rusqlite::Error) -> Error {
    if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        Error::constraint(err)
    } else {
        Error::driver(err)
    }
}
