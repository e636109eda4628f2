use super::{Comma, Delimited, Flavor, Ident, Params, ToSql};

use crate::stmt::{self, PatternKind};

impl ToSql for &stmt::Expr {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        use stmt::Expr::*;

        match self {
            And(expr) => match &expr.operands[..] {
                [] => fmt!(f, "1 = 1"),
                [operand] => fmt!(f, operand),
                operands => fmt!(f, "(" Delimited(operands, " AND ") ")"),
            },
            Or(expr) => match &expr.operands[..] {
                [] => fmt!(f, "1 = 0"),
                [operand] => fmt!(f, operand),
                operands => fmt!(f, "(" Delimited(operands, " OR ") ")"),
            },
            Not(expr) => {
                let inner = &*expr.expr;
                fmt!(f, "NOT (" inner ")")
            }
            BinaryOp(expr) => {
                let lhs = &*expr.lhs;
                let rhs = &*expr.rhs;

                match (rhs, expr.op) {
                    (Value(stmt::Value::Null), stmt::BinaryOp::Eq) => fmt!(f, lhs " IS NULL"),
                    (Value(stmt::Value::Null), stmt::BinaryOp::Ne) => fmt!(f, lhs " IS NOT NULL"),
                    _ => fmt!(f, lhs " " expr.op.as_sql() " " rhs),
                }
            }
            Column(column) => column.to_sql(f),
            Func(func) => func.to_sql(f),
            HasNeighbors(expr) => expr.to_sql(f),
            InList(expr) => {
                let lhs = &*expr.expr;

                match (&expr.list[..], expr.negate) {
                    ([], false) => fmt!(f, "1 = 0"),
                    ([], true) => fmt!(f, "1 = 1"),
                    (list, false) => fmt!(f, lhs " IN (" Comma(list) ")"),
                    (list, true) => fmt!(f, lhs " NOT IN (" Comma(list) ")"),
                }
            }
            IsNull(expr) => {
                let lhs = &*expr.expr;
                let check = if expr.negate { " IS NOT NULL" } else { " IS NULL" };
                fmt!(f, lhs check)
            }
            Pattern(expr) => expr.to_sql(f),
            Value(value) => value.to_sql(f),
        }
    }
}

impl ToSql for &stmt::ExprColumn {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match (&self.table, f.scope) {
            (Some(table), _) => fmt!(f, Ident(table) "." Ident(&self.name)),
            (None, Some(scope)) => fmt!(f, Ident(scope) "." Ident(&self.name)),
            (None, None) => fmt!(f, Ident(&self.name)),
        }
    }
}

impl ToSql for &stmt::ExprFunc {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        use stmt::ExprFunc::*;

        match self {
            Count(count) => match (count.arg.as_deref(), count.distinct) {
                (None, _) => fmt!(f, "COUNT(*)"),
                (Some(arg), false) => fmt!(f, "COUNT(" arg ")"),
                (Some(arg), true) => fmt!(f, "COUNT(DISTINCT " arg ")"),
            },
            // PostgreSQL widens SUM(BIGINT) and AVG to NUMERIC
            Sum(agg) if f.serializer.is_postgresql() => {
                let arg = &*agg.arg;
                let ty = match agg.ty {
                    stmt::Type::I64 => "BIGINT",
                    _ => "DOUBLE PRECISION",
                };
                fmt!(f, "CAST(SUM(" arg ") AS " ty ")")
            }
            Avg(agg) if f.serializer.is_postgresql() => {
                let arg = &*agg.arg;
                fmt!(f, "CAST(AVG(" arg ") AS DOUBLE PRECISION)")
            }
            Sum(agg) => aggregate(f, "SUM(", &agg.arg),
            Avg(agg) => aggregate(f, "AVG(", &agg.arg),
            Max(agg) => aggregate(f, "MAX(", &agg.arg),
            Min(agg) => aggregate(f, "MIN(", &agg.arg),
            Coalesce(args) => fmt!(f, "COALESCE(" Comma(args) ")"),
        }
    }
}

fn aggregate<P: Params>(f: &mut super::Formatter<'_, P>, open: &str, arg: &stmt::Expr) {
    fmt!(f, open arg ")")
}

impl ToSql for &stmt::ExprHasNeighbors {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let Some(column) = self.columns.first() else {
            // Nothing to join on
            return fmt!(f, "1 = 0");
        };

        if self.fk_on_self() {
            let fk = stmt::Expr::column(column);
            let fk = &fk;
            return fmt!(f, fk " IS NOT NULL");
        }

        let neighbor = stmt::Expr::qualified_column(
            &self.table,
            self.neighbor_column().unwrap_or(column),
        );
        let neighbor = &neighbor;
        let id = stmt::Expr::column("id");
        let id = &id;

        fmt!(f, "EXISTS (SELECT 1 FROM " Ident(&self.table) " WHERE " neighbor " = " id ")");
    }
}

impl ToSql for &stmt::ExprPattern {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let expr = &*self.expr;

        if self.fold {
            let value = self.value.to_lowercase();

            if self.kind == PatternKind::Equal {
                let value = &stmt::Value::String(value);
                return fmt!(f, "LOWER(" expr ") = " value);
            }

            let pattern = &stmt::Value::String(like_pattern(self.kind, &value));
            return fmt!(f, "LOWER(" expr ") LIKE " pattern " ESCAPE '!'");
        }

        if self.kind == PatternKind::Equal {
            let value = &stmt::Value::String(self.value.clone());
            return fmt!(f, expr " = " value);
        }

        let flavor = f.serializer.flavor;
        match flavor {
            // LIKE is case-insensitive for ASCII in SQLite; GLOB is not
            Flavor::Sqlite => {
                let pattern = &stmt::Value::String(glob_pattern(self.kind, &self.value));
                fmt!(f, expr " GLOB " pattern)
            }
            // The default collations are case-insensitive
            Flavor::Mysql => {
                let pattern = &stmt::Value::String(like_pattern(self.kind, &self.value));
                fmt!(f, "CAST(" expr " AS BINARY) LIKE " pattern " ESCAPE '!'")
            }
            Flavor::Postgresql => {
                let pattern = &stmt::Value::String(like_pattern(self.kind, &self.value));
                fmt!(f, expr " LIKE " pattern " ESCAPE '!'")
            }
        }
    }
}

/// Builds a LIKE pattern with `!` as the escape character.
fn like_pattern(kind: PatternKind, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        if matches!(ch, '!' | '%' | '_') {
            escaped.push('!');
        }
        escaped.push(ch);
    }

    match kind {
        PatternKind::Equal => escaped,
        PatternKind::Contains => format!("%{escaped}%"),
        PatternKind::Prefix => format!("{escaped}%"),
        PatternKind::Suffix => format!("%{escaped}"),
    }
}

/// Builds a GLOB pattern. Wildcards are escaped by wrapping them in a
/// character class.
fn glob_pattern(kind: PatternKind, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        match ch {
            '*' | '?' | '[' => {
                escaped.push('[');
                escaped.push(ch);
                escaped.push(']');
            }
            ch => escaped.push(ch),
        }
    }

    match kind {
        PatternKind::Equal => escaped,
        PatternKind::Contains => format!("*{escaped}*"),
        PatternKind::Prefix => format!("{escaped}*"),
        PatternKind::Suffix => format!("*{escaped}"),
    }
}
