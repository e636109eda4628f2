use super::Expr;

/// Logical OR of its operands. With no operands the expression is false.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprOr {
    pub operands: Vec<Expr>,
}

impl Expr {
    pub fn or(lhs: impl Into<Self>, rhs: impl Into<Self>) -> Self {
        Expr::or_from_vec(vec![lhs.into(), rhs.into()])
    }

    pub fn or_from_vec(operands: Vec<Expr>) -> Self {
        let mut flat = Vec::with_capacity(operands.len());

        for operand in operands {
            match operand {
                Expr::Or(or) => flat.extend(or.operands),
                operand => flat.push(operand),
            }
        }

        if flat.len() == 1 {
            return flat.remove(0);
        }

        ExprOr { operands: flat }.into()
    }
}

impl From<ExprOr> for Expr {
    fn from(value: ExprOr) -> Self {
        Self::Or(value)
    }
}
