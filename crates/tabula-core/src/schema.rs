//! Runtime table descriptors.
//!
//! Tables are described programmatically: a [`Table`] is a name, an ordered
//! set of [`Column`]s and an implicit auto-increment `id` primary key. The
//! [`Catalog`] maps table names to shared descriptor snapshots and is the
//! source of truth for SQL generation and row decoding.

mod catalog;
pub use catalog::Catalog;

mod column;
pub use column::Column;

mod column_type;
pub use column_type::ColumnType;

mod table;
pub use table::{ForeignKey, Index, ReferenceOption, Table};
