//! A runtime-schema data access layer for MySQL, PostgreSQL and SQLite.
//!
//! Tables are described at runtime with [`schema::Table`] and registered on
//! a [`Client`]. Rows are read and written as [`Entity`] values through the
//! builders returned by a [`Table`] handle.

mod client;
pub use client::{Builder, Client, Connect, Pool, PoolConfig, PoolConnection, Timeouts};

mod create;
pub use create::{Create, CreateBulk};

mod delete;
pub use delete::{Delete, DeleteOne};

mod entity;
pub use entity::{Edges, Entity};

pub mod migrate;
pub use migrate::{MigrateOption, Schema};

mod mutation;
pub use mutation::{Mutation, Op};

pub mod predicate;
pub use predicate::Predicate;

pub mod query;
pub use query::{Order, Query};

mod table;
pub use table::Table;

mod transaction;
pub use transaction::{Tx, TxOptions};

mod update;
pub use update::{Update, UpdateOne};

pub use tabula_core::{driver, schema, stmt, Error, Result};
pub use tabula_core::stmt::Value;
