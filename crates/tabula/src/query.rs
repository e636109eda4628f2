mod eager;
use eager::Eager;

mod group_by;
pub use group_by::{count, count_of, max, mean, min, sum, Aggregate, GroupBy};

mod select;
pub use select::{Record, Select};

use crate::{
    predicate::{self, Predicate},
    schema,
    stmt::{self, Direction, Expr, OrderBy, ValueRecord},
    Entity, Error, Result, Table, Value,
};

use indexmap::IndexMap;

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    column: String,
    direction: Direction,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Order {
        Order {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Order {
        Order {
            column: column.into(),
            direction: Direction::Desc,
        }
    }
}

/// Builds a `SELECT` over one table and loads the matching rows as
/// entities, optionally eager loading related rows.
///
/// Builder methods never fail; errors such as an unknown column are
/// reported by the terminal operation before any statement is sent.
#[derive(Debug, Clone)]
pub struct Query {
    table: Table,
    predicates: Vec<Predicate>,
    order: Vec<Order>,
    limit: Option<u64>,
    offset: Option<u64>,
    unique: Option<bool>,

    /// Columns loaded into entities. Empty loads every column.
    columns: Vec<String>,

    /// Eager loads keyed by store key, run in insertion order
    with: IndexMap<String, Eager>,

    error: Option<Error>,
}

impl Query {
    pub(crate) fn new(table: Table) -> Query {
        Query {
            table,
            predicates: vec![],
            order: vec![],
            limit: None,
            offset: None,
            unique: None,
            columns: vec![],
            with: IndexMap::new(),
            error: None,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Adds a predicate. All predicates must hold.
    pub fn filter(mut self, predicate: Predicate) -> Query {
        self.predicates.push(predicate);
        self
    }

    pub fn limit(mut self, limit: u64) -> Query {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Query {
        self.offset = Some(offset);
        self
    }

    /// Selects distinct rows.
    pub fn unique(mut self, unique: bool) -> Query {
        self.unique = Some(unique);
        self
    }

    pub fn order(mut self, order: Order) -> Query {
        self.order.push(order);
        self
    }

    /// Loads a to-one relation: `from_key` on this table holds the id of a
    /// row in `table`, stored under `store_key` in each entity's single
    /// edges.
    pub fn with_data(
        self,
        table: &str,
        store_key: impl Into<String>,
        from_key: impl Into<String>,
    ) -> Query {
        self.with_data_by(table, store_key, from_key, |query| query)
    }

    /// Like [`with_data`](Self::with_data), with `configure` applied to the
    /// query that loads the related rows.
    pub fn with_data_by(
        self,
        table: &str,
        store_key: impl Into<String>,
        from_key: impl Into<String>,
        configure: impl FnOnce(Query) -> Query,
    ) -> Query {
        self.with(table, store_key.into(), from_key.into(), true, configure)
    }

    /// Loads a to-many relation: `from_key` on `table` holds the id of a
    /// row of this table, stored under `store_key` in each entity's list
    /// edges.
    pub fn with_list_data(
        self,
        table: &str,
        store_key: impl Into<String>,
        from_key: impl Into<String>,
    ) -> Query {
        self.with_list_data_by(table, store_key, from_key, |query| query)
    }

    pub fn with_list_data_by(
        self,
        table: &str,
        store_key: impl Into<String>,
        from_key: impl Into<String>,
        configure: impl FnOnce(Query) -> Query,
    ) -> Query {
        self.with(table, store_key.into(), from_key.into(), false, configure)
    }

    fn with(
        mut self,
        table: &str,
        store_key: String,
        from_key: String,
        single: bool,
        configure: impl FnOnce(Query) -> Query,
    ) -> Query {
        match self.table.client().table(table) {
            Ok(table) => {
                let query = configure(table.query());
                self.with.insert(
                    store_key,
                    Eager {
                        from_key,
                        single,
                        query,
                    },
                );
            }
            Err(err) => self.record(err),
        }

        self
    }

    /// Projects `fields` instead of loading entities.
    pub fn select<I, S>(self, fields: I) -> Select
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Select::new(self, fields.into_iter().map(Into::into).collect())
    }

    /// Groups rows by `fields` for aggregation.
    pub fn group_by<I, S>(self, fields: I) -> GroupBy
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GroupBy::new(self, fields.into_iter().map(Into::into).collect())
    }

    /// Restricts the columns loaded into entities. `id` is always loaded.
    pub(crate) fn columns(mut self, columns: Vec<String>) -> Query {
        self.columns = columns;
        self
    }

    pub async fn all(&self) -> Result<Vec<Entity>> {
        self.prepare()?;
        self.load().await
    }

    /// The first matching row.
    pub async fn first(&self) -> Result<Entity> {
        let mut entities = self.clone().limit(1).all().await?;
        entities.pop().ok_or_else(|| self.not_found())
    }

    /// The only matching row. Fails if there are none or more than one.
    pub async fn only(&self) -> Result<Entity> {
        let mut entities = self.clone().limit(2).all().await?;

        match entities.len() {
            0 => Err(self.not_found()),
            1 => Ok(entities.remove(0)),
            _ => Err(self.not_singular()),
        }
    }

    pub async fn ids(&self) -> Result<Vec<i64>> {
        self.prepare()?;

        let stmt = self.select_stmt(vec![Expr::column(schema::Table::ID)])?;
        let rows = self
            .table
            .client()
            .query(stmt, vec![stmt::Type::I64])
            .await?;

        rows.into_iter().map(|row| record_i64(&row)).collect()
    }

    pub async fn first_id(&self) -> Result<i64> {
        let mut ids = self.clone().limit(1).ids().await?;
        ids.pop().ok_or_else(|| self.not_found())
    }

    pub async fn only_id(&self) -> Result<i64> {
        let ids = self.clone().limit(2).ids().await?;

        match ids[..] {
            [] => Err(self.not_found()),
            [id] => Ok(id),
            _ => Err(self.not_singular()),
        }
    }

    /// Counts matching rows. Ordering and pagination are ignored.
    pub async fn count(&self) -> Result<u64> {
        self.prepare()?;

        let mut stmt = self.select_stmt(vec![Expr::count_star()])?;
        stmt.distinct = false;
        stmt.order_by.clear();
        stmt.limit = None;
        stmt.offset = None;

        let rows = self
            .table
            .client()
            .query(stmt, vec![stmt::Type::I64])
            .await?;

        let count = match rows.first() {
            Some(row) => record_i64(row)?,
            None => return Err(Error::invalid_result("COUNT(*) returned no rows")),
        };

        u64::try_from(count).map_err(|_| Error::invalid_result(format!("negative count {count}")))
    }

    pub async fn exist(&self) -> Result<bool> {
        Ok(self.count().await? > 0)
    }

    /// Validates everything the query names, including eager loads.
    fn prepare(&self) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let table = self.table.schema();

        for column in &self.columns {
            table.resolve(column)?;
        }

        for order in &self.order {
            table.resolve(&order.column)?;
        }

        eager::validate(self)
    }

    /// Loads entities without validating first.
    async fn load(&self) -> Result<Vec<Entity>> {
        let columns = self.entity_columns();
        let table = self.table.schema();

        let ret = columns
            .iter()
            .map(|column| table.resolve(column).map(|column| column.ty.ty()))
            .collect::<Result<Vec<_>>>()?;

        let stmt = self.select_stmt(columns.iter().map(|column| Expr::column(column)).collect())?;
        let rows = self.table.client().query(stmt, ret).await?;

        let table = self.table.downgrade();
        let mut entities = rows
            .into_iter()
            .map(|row| Entity::from_record(table.clone(), &columns, row))
            .collect::<Result<Vec<_>>>()?;

        eager::load(self, &mut entities).await?;
        Ok(entities)
    }

    fn entity_columns(&self) -> Vec<String> {
        if self.columns.is_empty() {
            return self
                .table
                .columns()
                .into_iter()
                .map(str::to_string)
                .collect();
        }

        let mut columns = vec![schema::Table::ID.to_string()];
        for column in &self.columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        columns
    }

    fn filter_expr(&self) -> Result<Option<Expr>> {
        let operands = predicate::lower_all(&self.predicates, self.table.schema())?;

        Ok(match operands.is_empty() {
            true => None,
            false => Some(Expr::and_from_vec(operands)),
        })
    }

    fn select_stmt(&self, returning: Vec<Expr>) -> Result<stmt::Select> {
        let mut stmt = stmt::Select::new(self.table.name(), returning);

        stmt.distinct = self.unique == Some(true);
        stmt.filter = self.filter_expr()?;
        stmt.order_by = self
            .order
            .iter()
            .map(|order| OrderBy {
                column: order.column.clone(),
                direction: order.direction,
            })
            .collect();
        stmt.limit = self.limit;
        stmt.offset = self.offset;

        Ok(stmt)
    }

    fn record(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn not_found(&self) -> Error {
        Error::record_not_found(format!("table={}", self.table.name()))
    }

    fn not_singular(&self) -> Error {
        Error::too_many_records(format!("table={}", self.table.name()))
    }
}

fn record_i64(row: &ValueRecord) -> Result<i64> {
    match row.first() {
        Some(Value::I64(value)) => Ok(*value),
        Some(value) => Err(Error::type_conversion(value, "i64")),
        None => Err(Error::invalid_result("expected one column, got none")),
    }
}
