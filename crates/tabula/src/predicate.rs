//! Composable row filters.
//!
//! Predicates name columns by string and are checked against the table
//! descriptor when the statement is prepared: an unknown column or a value
//! the column cannot hold fails with a validation error before anything is
//! sent to the database.
//!
//! ```
//! use tabula::predicate::{and, int_eq, not, or, string_has_prefix};
//!
//! let filter = and([
//!     int_eq("age", 30),
//!     or([string_has_prefix("name", "a"), not(int_eq("score", 0))]),
//! ]);
//! # let _ = filter;
//! ```

use crate::{
    schema,
    stmt::{BinaryOp, Expr, ExprHasNeighbors, PatternKind, Rel},
    Error, Result, Value,
};

use jiff::Timestamp;

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    Compare {
        column: String,
        op: BinaryOp,
        value: Value,
    },
    InList {
        column: String,
        values: Vec<Value>,
        negate: bool,
    },
    IsNull {
        column: String,
        negate: bool,
    },
    Pattern {
        column: String,
        kind: PatternKind,
        value: String,
        fold: bool,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    HasNeighbors(ExprHasNeighbors),
}

impl Predicate {
    fn new(kind: Kind) -> Predicate {
        Predicate { kind }
    }

    /// Lowers the predicate to a filter expression over `table`.
    pub fn lower(&self, table: &schema::Table) -> Result<Expr> {
        Ok(match &self.kind {
            Kind::Compare { column, op, value } => {
                let value = operand(table, column, value.clone())?;
                Expr::binary_op(Expr::column(column), *op, value)
            }
            Kind::InList {
                column,
                values,
                negate,
            } => {
                let values = values
                    .iter()
                    .map(|value| operand(table, column, value.clone()))
                    .collect::<Result<Vec<_>>>()?;

                match negate {
                    false => Expr::in_list(Expr::column(column), values),
                    true => Expr::not_in_list(Expr::column(column), values),
                }
            }
            Kind::IsNull { column, negate } => {
                table.resolve(column)?;

                match negate {
                    false => Expr::is_null(Expr::column(column)),
                    true => Expr::is_not_null(Expr::column(column)),
                }
            }
            Kind::Pattern {
                column,
                kind,
                value,
                fold,
            } => {
                let field = table.resolve(column)?;

                if field.ty.ty() != crate::stmt::Type::String {
                    return Err(Error::validation(
                        Some(column),
                        format!("string predicate on {} column", field.ty),
                    ));
                }

                Expr::pattern(Expr::column(column), *kind, value, *fold)
            }
            Kind::And(operands) => Expr::and_from_vec(lower_all(operands, table)?),
            Kind::Or(operands) => Expr::or_from_vec(lower_all(operands, table)?),
            Kind::Not(operand) => Expr::not(operand.lower(table)?),
            Kind::HasNeighbors(has) => {
                if has.fk_on_self() {
                    if let Some(column) = has.neighbor_column() {
                        table.resolve(column)?;
                    }
                }

                has.clone().into()
            }
        })
    }
}

/// Lowers each predicate over `table`.
pub(crate) fn lower_all(predicates: &[Predicate], table: &schema::Table) -> Result<Vec<Expr>> {
    predicates
        .iter()
        .map(|predicate| predicate.lower(table))
        .collect()
}

/// Checks that `value` can be compared with `column`.
fn operand(table: &schema::Table, column: &str, value: Value) -> Result<Value> {
    let field = table.resolve(column)?;

    if value.is_null() || !field.ty.accepts(&value) {
        return Err(Error::validation(
            Some(column),
            format!("cannot compare {} column with {} value", field.ty, value.kind_name()),
        ));
    }

    field
        .ty
        .normalize(value)
        .map_err(|err| Error::validation(Some(column), err.to_string()))
}

fn compare(column: impl Into<String>, op: BinaryOp, value: impl Into<Value>) -> Predicate {
    Predicate::new(Kind::Compare {
        column: column.into(),
        op,
        value: value.into(),
    })
}

fn in_list<T: Into<Value>>(
    column: impl Into<String>,
    values: impl IntoIterator<Item = T>,
    negate: bool,
) -> Predicate {
    Predicate::new(Kind::InList {
        column: column.into(),
        values: values.into_iter().map(Into::into).collect(),
        negate,
    })
}

fn pattern(column: impl Into<String>, kind: PatternKind, value: impl Into<String>, fold: bool) -> Predicate {
    Predicate::new(Kind::Pattern {
        column: column.into(),
        kind,
        value: value.into(),
        fold,
    })
}

macro_rules! comparators {
    (
        $ty:ty;
        $eq:ident, $ne:ident, $gt:ident, $gte:ident, $lt:ident, $lte:ident,
        $in_:ident, $not_in:ident
    ) => {
        pub fn $eq(column: impl Into<String>, value: impl Into<$ty>) -> Predicate {
            compare(column, BinaryOp::Eq, value.into())
        }

        pub fn $ne(column: impl Into<String>, value: impl Into<$ty>) -> Predicate {
            compare(column, BinaryOp::Ne, value.into())
        }

        pub fn $gt(column: impl Into<String>, value: impl Into<$ty>) -> Predicate {
            compare(column, BinaryOp::Gt, value.into())
        }

        pub fn $gte(column: impl Into<String>, value: impl Into<$ty>) -> Predicate {
            compare(column, BinaryOp::Ge, value.into())
        }

        pub fn $lt(column: impl Into<String>, value: impl Into<$ty>) -> Predicate {
            compare(column, BinaryOp::Lt, value.into())
        }

        pub fn $lte(column: impl Into<String>, value: impl Into<$ty>) -> Predicate {
            compare(column, BinaryOp::Le, value.into())
        }

        pub fn $in_(column: impl Into<String>, values: impl IntoIterator<Item = $ty>) -> Predicate {
            in_list(column, values, false)
        }

        pub fn $not_in(
            column: impl Into<String>,
            values: impl IntoIterator<Item = $ty>,
        ) -> Predicate {
            in_list(column, values, true)
        }
    };
}

comparators!(i64; int_eq, int_ne, int_gt, int_gte, int_lt, int_lte, int_in, int_not_in);
comparators!(f64; float_eq, float_ne, float_gt, float_gte, float_lt, float_lte, float_in, float_not_in);
comparators!(String; string_eq, string_ne, string_gt, string_gte, string_lt, string_lte, string_in, string_not_in);
comparators!(Timestamp; time_eq, time_ne, time_gt, time_gte, time_lt, time_lte, time_in, time_not_in);
comparators!(bool; bool_eq, bool_ne, bool_gt, bool_gte, bool_lt, bool_lte, bool_in, bool_not_in);

/// Matches rows by primary key.
pub fn id(id: i64) -> Predicate {
    id_eq(id)
}

pub fn id_eq(id: i64) -> Predicate {
    int_eq(schema::Table::ID, id)
}

pub fn id_ne(id: i64) -> Predicate {
    int_ne(schema::Table::ID, id)
}

pub fn id_gt(id: i64) -> Predicate {
    int_gt(schema::Table::ID, id)
}

pub fn id_gte(id: i64) -> Predicate {
    int_gte(schema::Table::ID, id)
}

pub fn id_lt(id: i64) -> Predicate {
    int_lt(schema::Table::ID, id)
}

pub fn id_lte(id: i64) -> Predicate {
    int_lte(schema::Table::ID, id)
}

pub fn id_in(ids: impl IntoIterator<Item = i64>) -> Predicate {
    int_in(schema::Table::ID, ids)
}

pub fn id_not_in(ids: impl IntoIterator<Item = i64>) -> Predicate {
    int_not_in(schema::Table::ID, ids)
}

pub fn string_contains(column: impl Into<String>, substr: impl Into<String>) -> Predicate {
    pattern(column, PatternKind::Contains, substr, false)
}

pub fn string_has_prefix(column: impl Into<String>, prefix: impl Into<String>) -> Predicate {
    pattern(column, PatternKind::Prefix, prefix, false)
}

pub fn string_has_suffix(column: impl Into<String>, suffix: impl Into<String>) -> Predicate {
    pattern(column, PatternKind::Suffix, suffix, false)
}

/// Case-insensitive equality.
pub fn string_equal_fold(column: impl Into<String>, value: impl Into<String>) -> Predicate {
    pattern(column, PatternKind::Equal, value, true)
}

/// Case-insensitive substring match.
pub fn string_contains_fold(column: impl Into<String>, substr: impl Into<String>) -> Predicate {
    pattern(column, PatternKind::Contains, substr, true)
}

pub fn is_null(column: impl Into<String>) -> Predicate {
    Predicate::new(Kind::IsNull {
        column: column.into(),
        negate: false,
    })
}

pub fn not_null(column: impl Into<String>) -> Predicate {
    Predicate::new(Kind::IsNull {
        column: column.into(),
        negate: true,
    })
}

/// Matches rows satisfying every predicate. Matches all rows when empty.
pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::new(Kind::And(predicates.into_iter().collect()))
}

/// Matches rows satisfying any predicate. Matches no rows when empty.
pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::new(Kind::Or(predicates.into_iter().collect()))
}

pub fn not(predicate: Predicate) -> Predicate {
    Predicate::new(Kind::Not(Box::new(predicate)))
}

/// Matches rows with at least one neighbor in `table`.
///
/// `columns[0]` is the foreign key column. It lives on the filtered table
/// for `M2O` relations and for inverse `O2O`/`O2M` relations, and on `table`
/// otherwise. For `M2M`, `table` is the join table holding both keys.
pub fn has_table<I, S>(rel: Rel, inverse: bool, table: impl Into<String>, columns: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Predicate::new(Kind::HasNeighbors(ExprHasNeighbors {
        rel,
        inverse,
        table: table.into(),
        columns: columns.into_iter().map(Into::into).collect(),
    }))
}
