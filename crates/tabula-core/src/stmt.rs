//! Values, expressions and statements exchanged between the query layer,
//! the SQL serializer and drivers.

mod delete;
pub use delete::Delete;

mod expr;
pub use expr::Expr;

mod expr_and;
pub use expr_and::ExprAnd;

mod expr_binary_op;
pub use expr_binary_op::ExprBinaryOp;

mod expr_column;
pub use expr_column::ExprColumn;

mod expr_func;
pub use expr_func::{ExprFunc, FuncAggregate, FuncCount};

mod expr_has_neighbors;
pub use expr_has_neighbors::{ExprHasNeighbors, Rel};

mod expr_in_list;
pub use expr_in_list::ExprInList;

mod expr_is_null;
pub use expr_is_null::ExprIsNull;

mod expr_not;
pub use expr_not::ExprNot;

mod expr_or;
pub use expr_or::ExprOr;

mod expr_pattern;
pub use expr_pattern::{ExprPattern, PatternKind};

mod insert;
pub use insert::Insert;

mod op_binary;
pub use op_binary::BinaryOp;

mod order_by;
pub use order_by::{Direction, OrderBy};

mod select;
pub use select::Select;

mod time;
pub use time::{format_time, parse_time};

mod ty;
pub use ty::Type;

mod update;
pub use update::{Assignment, Update};

mod value;
pub use value::Value;

mod value_record;
pub use value_record::ValueRecord;

/// A statement sent to a SQL driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Query(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    /// The table the statement targets.
    pub fn table(&self) -> &str {
        match self {
            Statement::Query(stmt) => &stmt.table,
            Statement::Insert(stmt) => &stmt.table,
            Statement::Update(stmt) => &stmt.table,
            Statement::Delete(stmt) => &stmt.table,
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Statement::Query(_))
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Query(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}
