use super::Expr;

/// Matches a string expression against a literal.
///
/// The literal is matched verbatim; the serializer escapes wildcard
/// characters for the target database.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprPattern {
    pub expr: Box<Expr>,
    pub kind: PatternKind,
    pub value: String,

    /// Compare under simple Unicode case folding
    pub fold: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// The whole string
    Equal,
    Contains,
    Prefix,
    Suffix,
}

impl Expr {
    pub fn pattern(
        expr: impl Into<Self>,
        kind: PatternKind,
        value: impl Into<String>,
        fold: bool,
    ) -> Self {
        ExprPattern {
            expr: Box::new(expr.into()),
            kind,
            value: value.into(),
            fold,
        }
        .into()
    }
}

impl From<ExprPattern> for Expr {
    fn from(value: ExprPattern) -> Self {
        Self::Pattern(value)
    }
}
