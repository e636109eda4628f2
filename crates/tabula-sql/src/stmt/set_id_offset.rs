use super::Statement;

/// Moves a table's auto-increment sequence so the next generated id is
/// `offset`.
#[derive(Debug, Clone)]
pub struct SetIdOffset {
    pub table: String,
    pub offset: u64,
}

impl Statement {
    pub fn set_id_offset(table: impl Into<String>, offset: u64) -> Self {
        SetIdOffset {
            table: table.into(),
            offset,
        }
        .into()
    }
}

impl From<SetIdOffset> for Statement {
    fn from(value: SetIdOffset) -> Self {
        Self::SetIdOffset(value)
    }
}
