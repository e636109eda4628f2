//! Common imports for test files
//!
//! This module provides a convenient way to import frequently used items
//! in test files with `use tests::prelude::*;`

pub use crate::{assert_eq_unordered, tests, DbTest};

pub use tabula::{
    predicate::{self, *},
    query::{count, count_of, max, mean, min, sum, Order},
    schema::{Column, ColumnType, ForeignKey, Index},
    Client, Entity, Value,
};

/// Shorthand for a table descriptor that must be valid.
pub fn table<I>(name: &str, columns: I) -> tabula::schema::Table
where
    I: IntoIterator<Item = Column>,
{
    tabula::schema::Table::with_columns(name, columns).unwrap()
}
