use std::fmt;

/// The type a driver decodes a result column into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    I64,
    F64,
    String,
    Bytes,
    Json,
    Time,

    /// Decode into whatever the database reports
    Any,
}

impl Type {
    pub fn name(self) -> &'static str {
        match self {
            Type::Bool => "Bool",
            Type::I64 => "I64",
            Type::F64 => "F64",
            Type::String => "String",
            Type::Bytes => "Bytes",
            Type::Json => "Json",
            Type::Time => "Time",
            Type::Any => "Any",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
