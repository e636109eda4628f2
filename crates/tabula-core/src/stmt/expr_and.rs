use super::Expr;

/// Logical AND of its operands. With no operands the expression is true.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprAnd {
    pub operands: Vec<Expr>,
}

impl Expr {
    /// Combines two expressions, flattening nested ANDs.
    pub fn and(lhs: impl Into<Self>, rhs: impl Into<Self>) -> Self {
        Expr::and_from_vec(vec![lhs.into(), rhs.into()])
    }

    pub fn and_from_vec(operands: Vec<Expr>) -> Self {
        let mut flat = Vec::with_capacity(operands.len());

        for operand in operands {
            match operand {
                Expr::And(and) => flat.extend(and.operands),
                operand => flat.push(operand),
            }
        }

        if flat.len() == 1 {
            return flat.remove(0);
        }

        ExprAnd { operands: flat }.into()
    }
}

impl From<ExprAnd> for Expr {
    fn from(value: ExprAnd) -> Self {
        Self::And(value)
    }
}
