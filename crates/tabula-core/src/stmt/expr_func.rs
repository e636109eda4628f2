use super::{Expr, Type};

#[derive(Debug, Clone, PartialEq)]
pub enum ExprFunc {
    /// `COUNT(*)` or `COUNT([DISTINCT] expr)`
    Count(FuncCount),
    Sum(FuncAggregate),
    Avg(FuncAggregate),
    Max(FuncAggregate),
    Min(FuncAggregate),

    /// First non-null argument
    Coalesce(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncCount {
    /// When `None`, count rows
    pub arg: Option<Box<Expr>>,
    pub distinct: bool,
}

/// An aggregate over one argument.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncAggregate {
    pub arg: Box<Expr>,

    /// The type the aggregate result is decoded as
    pub ty: Type,
}

impl ExprFunc {
    pub(super) fn for_each_arg(&self, mut f: impl FnMut(&Expr)) {
        match self {
            ExprFunc::Count(count) => {
                if let Some(arg) = &count.arg {
                    f(arg);
                }
            }
            ExprFunc::Sum(agg) | ExprFunc::Avg(agg) | ExprFunc::Max(agg) | ExprFunc::Min(agg) => {
                f(&agg.arg)
            }
            ExprFunc::Coalesce(args) => args.iter().for_each(f),
        }
    }
}

impl Expr {
    pub fn count_star() -> Self {
        ExprFunc::Count(FuncCount {
            arg: None,
            distinct: false,
        })
        .into()
    }

    pub fn count(arg: impl Into<Self>, distinct: bool) -> Self {
        ExprFunc::Count(FuncCount {
            arg: Some(Box::new(arg.into())),
            distinct,
        })
        .into()
    }

    pub fn coalesce(args: impl IntoIterator<Item = Expr>) -> Self {
        ExprFunc::Coalesce(args.into_iter().collect()).into()
    }
}

impl From<ExprFunc> for Expr {
    fn from(value: ExprFunc) -> Self {
        Self::Func(value)
    }
}
