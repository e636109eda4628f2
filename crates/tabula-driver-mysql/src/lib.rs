mod value;
pub(crate) use value::Value;

use mysql_async::{
    prelude::{Queryable, ToValue},
    Conn, Pool,
};
use std::borrow::Cow;
use tabula_core::{
    async_trait,
    driver::{
        operation::{CreateTable, QuerySql},
        Capability, Driver, Operation, Response,
    },
    stmt::{self, ValueRecord},
    Error, Result,
};
use tabula_sql as sql;
use url::Url;

/// Server error codes reported for constraint violations: not-null (1048),
/// duplicate key (1062), foreign keys (1216, 1217, 1451, 1452) and check
/// constraints (3819).
const CONSTRAINT_CODES: &[u16] = &[1048, 1062, 1216, 1217, 1451, 1452, 3819];

#[derive(Debug)]
pub struct MySQL {
    url: String,
    pool: Pool,
}

impl MySQL {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver)?;

        if url.scheme() != "mysql" {
            return Err(Error::invalid_connection_url(format!(
                "connection url does not have a `mysql` scheme; url={url_str}"
            )));
        }

        if url.host_str().is_none() {
            return Err(Error::invalid_connection_url(format!(
                "missing host in connection URL; url={url_str}"
            )));
        }

        if url.path().trim_start_matches('/').is_empty() {
            return Err(Error::invalid_connection_url(format!(
                "no database specified - missing path in connection URL; url={url_str}"
            )));
        }

        let opts = mysql_async::Opts::from_url(url.as_ref())
            .map_err(|err| Error::invalid_connection_url(err.to_string()))?;
        // Report matched rows rather than changed rows from UPDATE
        let opts = mysql_async::OptsBuilder::from_opts(opts).client_found_rows(true);

        let pool = Pool::new(opts);
        Ok(Self {
            url: url_str,
            pool,
        })
    }
}

#[async_trait]
impl Driver for MySQL {
    fn url(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.url)
    }

    fn capability(&self) -> &'static Capability {
        &Capability::MYSQL
    }

    async fn connect(&self) -> Result<Box<dyn tabula_core::driver::Connection>> {
        let conn = self.pool.get_conn().await.map_err(classify)?;
        Ok(Box::new(Connection::new(conn)))
    }
}

#[derive(Debug)]
pub struct Connection {
    conn: Conn,
}

impl Connection {
    pub fn new(conn: Conn) -> Self {
        Self { conn }
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        tracing::trace!(sql, "mysql execute");
        self.conn.query_drop(sql).await.map_err(classify)
    }

    async fn create_table(&mut self, op: CreateTable) -> Result<Response> {
        let serializer = sql::Serializer::mysql();
        let mut params = Vec::<stmt::Value>::new();

        let sql = serializer.serialize(
            &sql::Statement::create_table(&op.table, op.foreign_keys),
            &mut params,
        );
        self.execute(&sql).await?;

        for index in &op.table.indexes {
            let sql = serializer.serialize(
                &sql::Statement::create_index(&op.table.name, index),
                &mut params,
            );
            self.execute(&sql).await?;
        }

        Ok(Response::count(0))
    }

    async fn query(
        &mut self,
        stmt: sql::Statement,
        ret: Option<Vec<stmt::Type>>,
        last_insert_id_hack: Option<u64>,
    ) -> Result<Response> {
        let mut params: Vec<stmt::Value> = Vec::new();
        let sql_as_str = sql::Serializer::mysql().serialize(&stmt, &mut params);

        tracing::trace!(sql = %sql_as_str, params = params.len(), "mysql query");

        let args = params
            .into_iter()
            .map(|param| Value::from(param).to_value())
            .collect::<Vec<_>>();

        let statement = self.conn.prep(&sql_as_str).await.map_err(classify)?;

        let Some(ret) = ret else {
            let count = self
                .conn
                .exec_iter(&statement, mysql_async::Params::Positional(args))
                .await
                .map_err(classify)?
                .affected_rows();

            return Ok(Response::count(count));
        };

        // MySQL has no RETURNING; generated ids are consecutive from
        // LAST_INSERT_ID() for a single multi-row INSERT
        if let Some(num_rows) = last_insert_id_hack {
            if !matches!(stmt, sql::Statement::Insert(_)) {
                return Err(Error::invalid_result(
                    "last_insert_id_hack is only valid for INSERT statements",
                ));
            }

            self.conn
                .exec_drop(&statement, mysql_async::Params::Positional(args))
                .await
                .map_err(classify)?;

            let first_id: u64 = self
                .conn
                .query_first("SELECT LAST_INSERT_ID()")
                .await
                .map_err(classify)?
                .ok_or_else(|| Error::invalid_result("LAST_INSERT_ID() returned no rows"))?;

            let records = (0..num_rows)
                .map(|offset| {
                    let id = (first_id + offset) as i64;
                    ValueRecord::from_vec(vec![stmt::Value::I64(id)])
                })
                .collect();

            return Ok(Response::values(records));
        }

        let rows: Vec<mysql_async::Row> = self
            .conn
            .exec(&statement, mysql_async::Params::Positional(args))
            .await
            .map_err(classify)?;

        let mut records = Vec::with_capacity(rows.len());

        for mut row in rows {
            if row.len() != ret.len() {
                return Err(Error::invalid_result(format!(
                    "expected {} columns, got {}",
                    ret.len(),
                    row.len()
                )));
            }

            let mut fields = Vec::with_capacity(ret.len());
            for (index, ty) in ret.iter().enumerate() {
                let value = row
                    .take::<mysql_async::Value, _>(index)
                    .unwrap_or(mysql_async::Value::NULL);
                fields.push(Value::from_sql(value, *ty)?.into_inner());
            }

            records.push(ValueRecord::from_vec(fields));
        }

        Ok(Response::values(records))
    }
}

impl From<Conn> for Connection {
    fn from(conn: Conn) -> Self {
        Self { conn }
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
            }) => self.query(stmt.into(), ret, last_insert_id_hack).await,
            Operation::Transaction(op) => {
                let sql = sql::Serializer::mysql().serialize_transaction(&op);
                self.execute(&sql).await?;
                Ok(Response::count(0))
            }
            Operation::CreateTable(op) => self.create_table(op).await,
            Operation::TableExists(op) => {
                let stmt = sql::Statement::table_exists(op.table);
                let rows = self
                    .query(stmt, Some(vec![stmt::Type::I64]), None)
                    .await?
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
                self.query(stmt, None, None).await
            }
        }
    }
}

fn classify(err: mysql_async::Error) -> Error {
    let constraint = matches!(
        &err,
        mysql_async::Error::Server(server) if CONSTRAINT_CODES.contains(&server.code)
    );

    if constraint {
        Error::constraint(err)
    } else {
        Error::driver(err)
    }
}
