use super::Operation;

/// Moves a table's id sequence so that the next generated id is `offset`.
#[derive(Debug, Clone)]
pub struct SetIdOffset {
    pub table: String,
    pub offset: u64,
}

impl From<SetIdOffset> for Operation {
    fn from(value: SetIdOffset) -> Self {
        Self::SetIdOffset(value)
    }
}
