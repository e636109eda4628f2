use super::Serializer;

use tabula_core::driver::Dialect;

#[derive(Debug, Clone, Copy)]
pub(super) enum Flavor {
    Postgresql,
    Sqlite,
    Mysql,
}

impl Serializer {
    pub fn sqlite() -> Serializer {
        Serializer {
            flavor: Flavor::Sqlite,
        }
    }

    pub fn postgresql() -> Serializer {
        Serializer {
            flavor: Flavor::Postgresql,
        }
    }

    pub fn mysql() -> Serializer {
        Serializer {
            flavor: Flavor::Mysql,
        }
    }

    pub fn for_dialect(dialect: Dialect) -> Serializer {
        match dialect {
            Dialect::Mysql => Serializer::mysql(),
            Dialect::Postgres => Serializer::postgresql(),
            Dialect::Sqlite => Serializer::sqlite(),
        }
    }
}
