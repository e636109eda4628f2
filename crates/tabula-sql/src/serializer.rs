#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited};

mod flavor;
use flavor::Flavor;

mod ident;
use ident::Ident;

mod params;
pub use params::{Params, Placeholder};

// Fragment serializers
mod column_def;
mod expr;
mod statement;
mod value;

use crate::stmt::Statement;

use tabula_core::driver::{operation::Transaction, Dialect, IsolationLevel};

/// Serialize a statement to a SQL string
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,

    /// Table that unqualified column references resolve against. Columns are
    /// rendered unqualified when unset.
    scope: Option<&'a str>,
}

impl Serializer {
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
            scope: None,
        };

        stmt.to_sql(&mut fmt);

        ret.push(';');
        ret
    }

    /// Serialize a transaction control operation to a SQL string.
    ///
    /// The generated SQL is flavor-specific (e.g., MySQL uses `START TRANSACTION`
    /// while other databases use `BEGIN`).
    pub fn serialize_transaction(&self, op: &Transaction) -> String {
        match op {
            Transaction::Start {
                isolation,
                read_only,
            } => self.serialize_transaction_start(*isolation, *read_only),
            Transaction::Commit => "COMMIT".to_string(),
            Transaction::Rollback => "ROLLBACK".to_string(),
        }
    }

    fn serialize_transaction_start(
        &self,
        isolation: Option<IsolationLevel>,
        read_only: bool,
    ) -> String {
        match self.flavor {
            Flavor::Mysql => {
                let mut sql = String::new();
                if let Some(level) = isolation {
                    sql.push_str("SET TRANSACTION ISOLATION LEVEL ");
                    sql.push_str(level.sql_name());
                    sql.push_str("; ");
                }
                sql.push_str("START TRANSACTION");
                if read_only {
                    sql.push_str(" READ ONLY");
                }
                sql
            }
            Flavor::Postgresql => {
                let mut sql = String::from("BEGIN");
                if let Some(level) = isolation {
                    sql.push_str(" ISOLATION LEVEL ");
                    sql.push_str(level.sql_name());
                }
                if read_only {
                    sql.push_str(" READ ONLY");
                }
                sql
            }
            Flavor::Sqlite => {
                // SQLite transactions are always serializable and have no
                // read-only mode
                "BEGIN".to_string()
            }
        }
    }

    fn is_mysql(&self) -> bool {
        matches!(self.flavor, Flavor::Mysql)
    }

    fn is_postgresql(&self) -> bool {
        matches!(self.flavor, Flavor::Postgresql)
    }

    fn is_sqlite(&self) -> bool {
        matches!(self.flavor, Flavor::Sqlite)
    }
}

impl From<Dialect> for Serializer {
    fn from(dialect: Dialect) -> Self {
        Serializer::for_dialect(dialect)
    }
}

impl<T> Formatter<'_, T> {
    /// Runs `f` with unqualified columns resolving against `table`.
    fn scoped<'s, R>(&mut self, table: &'s str, f: impl FnOnce(&mut Formatter<'_, T>) -> R) -> R {
        let mut scoped = Formatter {
            serializer: self.serializer,
            dst: &mut *self.dst,
            params: &mut *self.params,
            scope: Some(table),
        };
        f(&mut scoped)
    }
}
