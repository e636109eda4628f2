use super::{Flavor, Ident, Params, ToSql};

use tabula_core::{
    driver::Capability,
    schema::{Column, ColumnType},
};

/// A column definition inside `CREATE TABLE`.
pub(super) struct ColumnDef<'a>(pub(super) &'a Column);

/// The DDL type of a column.
struct SqlType<'a>(&'a Column);

impl ToSql for ColumnDef<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let column = self.0;
        let name = Ident(&column.name);

        if column.auto_increment {
            let def = match f.serializer.flavor {
                Flavor::Sqlite => " INTEGER PRIMARY KEY AUTOINCREMENT",
                Flavor::Postgresql => " BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY",
                // The primary key is declared after the columns
                Flavor::Mysql => " BIGINT NOT NULL AUTO_INCREMENT",
            };
            return fmt!(f, name def);
        }

        fmt!(f, name " " SqlType(column));

        if !column.nullable {
            fmt!(f, " NOT NULL");
        }

        if column.unique {
            fmt!(f, " UNIQUE");
        }
    }
}

impl ToSql for SqlType<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        use ColumnType::*;

        let column = self.0;

        if let Some(sql_type) = &column.sql_type {
            return fmt!(f, sql_type.as_str());
        }

        let flavor = f.serializer.flavor;
        let ty = match (column.ty, flavor) {
            (Int8 | Int16 | Int32 | Int64 | Int | Enum, Flavor::Sqlite)
            | (Uint8 | Uint16 | Uint32 | Uint64 | Uint, Flavor::Sqlite) => "INTEGER",

            (Int8, Flavor::Mysql) => "TINYINT",
            (Int16, Flavor::Mysql) => "SMALLINT",
            (Int32, Flavor::Mysql) => "INT",
            (Int64 | Int | Enum, Flavor::Mysql) => "BIGINT",
            (Uint8, Flavor::Mysql) => "TINYINT UNSIGNED",
            (Uint16, Flavor::Mysql) => "SMALLINT UNSIGNED",
            (Uint32, Flavor::Mysql) => "INT UNSIGNED",
            (Uint64 | Uint, Flavor::Mysql) => "BIGINT UNSIGNED",

            // PostgreSQL has no unsigned integers; widen to fit the range
            (Int8 | Int16 | Uint8, Flavor::Postgresql) => "SMALLINT",
            (Int32 | Uint16, Flavor::Postgresql) => "INTEGER",
            (Int64 | Int | Uint32 | Uint64 | Uint | Enum, Flavor::Postgresql) => "BIGINT",

            (Float32 | Float64, Flavor::Sqlite) => "REAL",
            (Float32, Flavor::Mysql) => "FLOAT",
            (Float64, Flavor::Mysql) => "DOUBLE",
            (Float32, Flavor::Postgresql) => "REAL",
            (Float64, Flavor::Postgresql) => "DOUBLE PRECISION",

            (String, Flavor::Mysql) => {
                // Longer keys exceed InnoDB's index prefix limit under utf8mb4
                let size = column
                    .size
                    .or(Capability::MYSQL.storage_types.default_varchar)
                    .unwrap_or(191);
                return fmt!(f, "VARCHAR(" size ")");
            }
            (String, _) => match column.size {
                Some(size) => return fmt!(f, "VARCHAR(" size ")"),
                None => "TEXT",
            },

            (Uuid, Flavor::Sqlite) => "TEXT",
            (Uuid, Flavor::Mysql) => "CHAR(36)",
            (Uuid, Flavor::Postgresql) => "UUID",

            (Json, Flavor::Postgresql) => "JSONB",
            (Json, _) => "JSON",

            (Bytes, Flavor::Postgresql) => "BYTEA",
            (Bytes, _) => "BLOB",

            (Time, Flavor::Sqlite) => "DATETIME",
            (Time, Flavor::Mysql) => "DATETIME(6)",
            (Time, Flavor::Postgresql) => "TIMESTAMPTZ",

            (Bool, _) => "BOOLEAN",

            (Other, Flavor::Postgresql) => "BYTEA",
            (Other, _) => "BLOB",
        };

        fmt!(f, ty)
    }
}
