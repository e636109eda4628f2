use super::{
    column_def::ColumnDef, ident::Literal, Comma, Flavor, Ident, Params, ToSql,
};

use crate::stmt::{self, Statement};
use tabula_core::schema::Table;

impl ToSql for &Statement {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match self {
            Statement::CreateIndex(stmt) => stmt.to_sql(f),
            Statement::CreateTable(stmt) => stmt.to_sql(f),
            Statement::Delete(stmt) => stmt.to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::Query(stmt) => stmt.to_sql(f),
            Statement::SetIdOffset(stmt) => stmt.to_sql(f),
            Statement::TableExists(stmt) => stmt.to_sql(f),
            Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

/// A column of the table in scope.
struct ScopedColumn<'a>(&'a str);

impl ToSql for ScopedColumn<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match f.scope {
            Some(scope) => fmt!(f, Ident(scope) "." Ident(self.0)),
            None => fmt!(f, Ident(self.0)),
        }
    }
}

/// One parenthesized `VALUES` row.
struct Row<'a>(&'a [stmt::Value]);

impl ToSql for Row<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        fmt!(f, "(" Comma(self.0) ")")
    }
}

impl ToSql for &stmt::Select {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        f.scoped(&self.table, |f| {
            let distinct = if self.distinct { "DISTINCT " } else { "" };
            let table = Ident(&self.table);

            fmt!(f, "SELECT " distinct Comma(&self.returning) " FROM " table);

            if let Some(filter) = &self.filter {
                fmt!(f, " WHERE " filter);
            }

            if !self.group_by.is_empty() {
                let columns = self.group_by.iter().map(|column| ScopedColumn(column));
                fmt!(f, " GROUP BY " Comma(columns));
            }

            if !self.order_by.is_empty() {
                fmt!(f, " ORDER BY " Comma(&self.order_by));
            }

            match (self.limit, self.offset) {
                (Some(limit), _) => fmt!(f, " LIMIT " limit),
                // Only PostgreSQL accepts OFFSET without LIMIT
                (None, Some(_)) => match f.serializer.flavor {
                    Flavor::Sqlite => fmt!(f, " LIMIT -1"),
                    Flavor::Mysql => fmt!(f, " LIMIT 18446744073709551615"),
                    Flavor::Postgresql => {}
                },
                (None, None) => {}
            }

            if let Some(offset) = self.offset {
                fmt!(f, " OFFSET " offset);
            }
        })
    }
}

impl ToSql for &stmt::OrderBy {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let direction = match self.direction {
            stmt::Direction::Asc => " ASC",
            stmt::Direction::Desc => " DESC",
        };

        fmt!(f, ScopedColumn(&self.column) direction)
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let table = Ident(&self.table);

        fmt!(f, "INSERT INTO " table);

        if self.columns.is_empty() {
            // Rows made entirely of defaults
            let (columns, row) = match f.serializer.flavor {
                Flavor::Mysql => (" ()", "()"),
                Flavor::Postgresql => (" (\"id\")", "(DEFAULT)"),
                Flavor::Sqlite => (" (\"id\")", "(NULL)"),
            };
            let rows = self.rows.iter().map(|_| row);

            fmt!(f, columns " VALUES " Comma(rows));
        } else {
            let columns = self.columns.iter().map(Ident);
            let rows = self.rows.iter().map(|row| Row(row));

            fmt!(f, " (" Comma(columns) ") VALUES " Comma(rows));
        }

        if self.returning_id {
            fmt!(f, " RETURNING " Ident(Table::ID));
        }
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        f.scoped(&self.table, |f| {
            let table = Ident(&self.table);

            fmt!(f, "UPDATE " table " SET " Comma(&self.assignments));

            if let Some(filter) = &self.filter {
                fmt!(f, " WHERE " filter);
            }
        })
    }
}

impl ToSql for &stmt::Assignment {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let expr = &self.expr;

        fmt!(f, Ident(&self.column) " = " expr)
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        f.scoped(&self.table, |f| {
            let table = Ident(&self.table);

            fmt!(f, "DELETE FROM " table);

            if let Some(filter) = &self.filter {
                fmt!(f, " WHERE " filter);
            }
        })
    }
}

impl ToSql for &stmt::CreateTable {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let table = &self.table;
        let name = Ident(&table.name);
        let columns = table.columns().map(ColumnDef);

        fmt!(f, "CREATE TABLE " name " (" Comma(columns));

        // MySQL declares the auto-increment key separately
        if f.serializer.is_mysql() {
            fmt!(f, ", PRIMARY KEY (" Ident(Table::ID) ")");
        }

        if self.foreign_keys {
            for fk in &table.foreign_keys {
                fmt!(
                    f, ", FOREIGN KEY (" Ident(&fk.column) ") REFERENCES " Ident(&fk.ref_table)
                    " (" Ident(Table::ID) ") ON DELETE " fk.on_delete.as_sql()
                );
            }
        }

        fmt!(f, ")")
    }
}

impl ToSql for &stmt::CreateIndex {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let index_name = Ident(&self.name);
        let table_name = Ident(&self.on);
        let columns = self.columns.iter().map(Ident);
        let unique = if self.unique { "UNIQUE " } else { "" };

        fmt!(f, "CREATE " unique "INDEX " index_name " ON " table_name " (" Comma(columns) ")");
    }
}

impl ToSql for &stmt::TableExists {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let table = Literal(&self.table);

        match f.serializer.flavor {
            Flavor::Sqlite => fmt!(
                f, "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = " table
            ),
            Flavor::Mysql => fmt!(
                f, "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = " table
            ),
            Flavor::Postgresql => fmt!(
                f, "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = CURRENT_SCHEMA() AND table_name = " table
            ),
        }
    }
}

impl ToSql for &stmt::SetIdOffset {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match f.serializer.flavor {
            // The sequence row holds the last id handed out
            Flavor::Sqlite => {
                let table = Literal(&self.table);
                let seq = self.offset.saturating_sub(1);
                fmt!(f, "INSERT INTO sqlite_sequence (name, seq) VALUES (" table ", " seq ")")
            }
            Flavor::Mysql => {
                let table = Ident(&self.table);
                fmt!(f, "ALTER TABLE " table " AUTO_INCREMENT = " self.offset)
            }
            Flavor::Postgresql => {
                let table = Ident(&self.table);
                let id = Ident(Table::ID);
                fmt!(f, "ALTER TABLE " table " ALTER COLUMN " id " RESTART WITH " self.offset)
            }
        }
    }
}
