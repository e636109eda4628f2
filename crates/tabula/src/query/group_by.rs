use super::{select, Query, Record};
use crate::{
    schema,
    stmt::{self, Expr, ExprFunc, FuncAggregate},
    Error, Result,
};

use serde::de::DeserializeOwned;

/// An aggregate function applied per group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    func: Func,

    /// Key of the result in each scanned record
    label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Func {
    Count,
    CountOf(String),
    Sum(String),
    Mean(String),
    Max(String),
    Min(String),
}

/// Number of rows, labelled `count`.
pub fn count() -> Aggregate {
    Aggregate::new(Func::Count, "count")
}

/// Number of non-null values of `column`, labelled `count`.
pub fn count_of(column: impl Into<String>) -> Aggregate {
    Aggregate::new(Func::CountOf(column.into()), "count")
}

pub fn sum(column: impl Into<String>) -> Aggregate {
    Aggregate::new(Func::Sum(column.into()), "sum")
}

pub fn mean(column: impl Into<String>) -> Aggregate {
    Aggregate::new(Func::Mean(column.into()), "mean")
}

pub fn max(column: impl Into<String>) -> Aggregate {
    Aggregate::new(Func::Max(column.into()), "max")
}

pub fn min(column: impl Into<String>) -> Aggregate {
    Aggregate::new(Func::Min(column.into()), "min")
}

impl Aggregate {
    fn new(func: Func, label: &str) -> Aggregate {
        Aggregate {
            func,
            label: label.to_string(),
        }
    }

    /// Stores the result under `label` instead of the function name.
    pub fn label(mut self, label: impl Into<String>) -> Aggregate {
        self.label = label.into();
        self
    }

    /// The projected expression and its result type.
    fn lower(&self, table: &schema::Table) -> Result<(Expr, stmt::Type)> {
        let numeric = |column: &str| -> Result<&schema::Column> {
            let field = table.resolve(column)?;

            if field.ty.is_integer() || field.ty.is_float() {
                Ok(field)
            } else {
                Err(Error::validation(
                    Some(column),
                    format!("cannot aggregate {} column as a number", field.ty),
                ))
            }
        };

        let aggregate = |column: &str, ty| FuncAggregate {
            arg: Box::new(Expr::column(column)),
            ty,
        };

        Ok(match &self.func {
            Func::Count => (Expr::count_star(), stmt::Type::I64),
            Func::CountOf(column) => {
                table.resolve(column)?;
                (Expr::count(Expr::column(column), false), stmt::Type::I64)
            }
            Func::Sum(column) => {
                let ty = numeric(column)?.ty.ty();
                (ExprFunc::Sum(aggregate(column, ty)).into(), ty)
            }
            Func::Mean(column) => {
                numeric(column)?;
                let ty = stmt::Type::F64;
                (ExprFunc::Avg(aggregate(column, ty)).into(), ty)
            }
            Func::Max(column) => {
                let ty = table.resolve(column)?.ty.ty();
                (ExprFunc::Max(aggregate(column, ty)).into(), ty)
            }
            Func::Min(column) => {
                let ty = table.resolve(column)?.ty.ty();
                (ExprFunc::Min(aggregate(column, ty)).into(), ty)
            }
        })
    }
}

/// Groups rows and computes aggregates per group.
///
/// Each scanned record holds the group columns followed by the aggregate
/// labels. Without group columns the aggregates cover all matching rows.
#[derive(Debug, Clone)]
pub struct GroupBy {
    query: Query,
    fields: Vec<String>,
    aggregates: Vec<Aggregate>,
}

impl GroupBy {
    pub(super) fn new(query: Query, fields: Vec<String>) -> GroupBy {
        GroupBy {
            query,
            fields,
            aggregates: vec![],
        }
    }

    pub fn aggregate(mut self, aggregates: impl IntoIterator<Item = Aggregate>) -> GroupBy {
        self.aggregates.extend(aggregates);
        self
    }

    pub async fn scan(&self) -> Result<Vec<Record>> {
        self.query.prepare()?;

        let table = self.query.table.schema();

        let mut labels = Vec::with_capacity(self.fields.len() + self.aggregates.len());
        let mut returning = Vec::with_capacity(labels.capacity());
        let mut ret = Vec::with_capacity(labels.capacity());

        for field in &self.fields {
            ret.push(table.resolve(field)?.ty.ty());
            returning.push(Expr::column(field));
            labels.push(field.clone());
        }

        for aggregate in &self.aggregates {
            let (expr, ty) = aggregate.lower(table)?;
            ret.push(ty);
            returning.push(expr);
            labels.push(aggregate.label.clone());
        }

        if returning.is_empty() {
            return Err(Error::validation(
                None::<String>,
                "group by needs at least one field or aggregate",
            ));
        }

        let mut stmt = self.query.select_stmt(returning)?;
        stmt.group_by = self.fields.clone();

        let rows = self.query.table.client().query(stmt, ret).await?;

        Ok(rows
            .into_iter()
            .map(|row| select::to_record(&labels, row))
            .collect())
    }

    /// Scans each group into `T` through its `serde` representation.
    pub async fn scan_into<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        select::deserialize(self.scan().await?)
    }
}
