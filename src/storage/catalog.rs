//! Schema catalog read-back

use rusqlite::Connection;
use serde::Serialize;

/// One user object from `sqlite_master` (table, index, view or trigger)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaObject {
    pub kind: String,
    pub name: String,
    pub table: String,
    pub sql: Option<String>,
}

/// A column as reported by `pragma_table_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub cid: i64,
    pub name: String,
    pub decl_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: u64,
}

impl TableInfo {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Everything a bootstrap run leaves behind in the store's catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaCatalog {
    pub objects: Vec<SchemaObject>,
    pub tables: Vec<TableInfo>,
}

impl SchemaCatalog {
    /// Read the catalog through an open connection.
    ///
    /// SQLite's own `sqlite_%` objects (autoindexes, `sqlite_sequence`) are skipped.
    pub fn read(conn: &Connection) -> rusqlite::Result<Self> {
        let mut stmt = conn.prepare(
            "SELECT type, name, tbl_name, sql FROM sqlite_master
             WHERE name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
             ORDER BY type, name",
        )?;
        let objects = stmt
            .query_map([], |row| {
                Ok(SchemaObject {
                    kind: row.get(0)?,
                    name: row.get(1)?,
                    table: row.get(2)?,
                    sql: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut tables = Vec::new();
        for object in objects.iter().filter(|o| o.kind == "table") {
            tables.push(TableInfo {
                name: object.name.clone(),
                columns: read_columns(conn, &object.name)?,
                rows: count_rows(conn, &object.name)?,
            });
        }

        Ok(Self { objects, tables })
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// `kind:name` for every object, in catalog order
    pub fn object_names(&self) -> Vec<String> {
        self.objects
            .iter()
            .map(|o| format!("{}:{}", o.kind, o.name))
            .collect()
    }
}

impl std::fmt::Display for SchemaCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = |kind: &str| self.objects.iter().filter(|o| o.kind == kind).count();
        writeln!(f, "Schema Catalog:")?;
        writeln!(f, "  Tables: {}", count("table"))?;
        writeln!(f, "  Indexes: {}", count("index"))?;
        writeln!(f, "  Views: {}", count("view"))?;
        writeln!(f, "  Triggers: {}", count("trigger"))
    }
}

fn read_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<Column>> {
    let mut stmt = conn.prepare(
        "SELECT cid, name, type, \"notnull\", pk, dflt_value FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let columns = stmt
        .query_map([table], |row| {
            Ok(Column {
                cid: row.get(0)?,
                name: row.get(1)?,
                decl_type: row.get(2)?,
                not_null: row.get::<_, i64>(3)? != 0,
                primary_key: row.get::<_, i64>(4)? > 0,
                default: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

fn count_rows(conn: &Connection, table: &str) -> rusqlite::Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count as u64)
}

/// Quote an identifier for interpolation into SQL
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
