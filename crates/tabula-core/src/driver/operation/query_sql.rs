use super::Operation;

use crate::stmt;

#[derive(Debug, Clone)]
pub struct QuerySql {
    /// The SQL query to execute
    pub stmt: stmt::Statement,

    /// Types of the returned columns. `None` when the statement only reports
    /// the number of affected rows.
    pub ret: Option<Vec<stmt::Type>>,

    /// MySQL-specific workaround for RETURNING from INSERT.
    ///
    /// When set, the insert is followed by `SELECT LAST_INSERT_ID()` and the
    /// driver returns one row per inserted record holding its generated id.
    /// Non-MySQL drivers should reject it.
    pub last_insert_id_hack: Option<u64>,
}

impl QuerySql {
    pub fn query(stmt: impl Into<stmt::Statement>, ret: Vec<stmt::Type>) -> Self {
        Self {
            stmt: stmt.into(),
            ret: Some(ret),
            last_insert_id_hack: None,
        }
    }

    pub fn exec(stmt: impl Into<stmt::Statement>) -> Self {
        Self {
            stmt: stmt.into(),
            ret: None,
            last_insert_id_hack: None,
        }
    }
}

impl From<QuerySql> for Operation {
    fn from(value: QuerySql) -> Self {
        Self::QuerySql(value)
    }
}
