use crate::storage::{SchemaObject, TableInfo};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Table")]
    table: String,
}

#[derive(Tabled)]
struct ColumnRow {
    #[tabled(rename = "Column")]
    name: String,
    #[tabled(rename = "Type")]
    decl_type: String,
    #[tabled(rename = "Not Null")]
    not_null: String,
    #[tabled(rename = "PK")]
    primary_key: String,
    #[tabled(rename = "Default")]
    default: String,
}

fn flag(on: bool) -> String {
    if on { "yes".to_string() } else { String::new() }
}

/// Schema objects as a rounded table; empty string when there are none
pub fn objects_table(objects: &[SchemaObject]) -> String {
    if objects.is_empty() {
        return String::new();
    }

    let rows: Vec<ObjectRow> = objects
        .iter()
        .map(|o| ObjectRow {
            kind: o.kind.clone(),
            name: o.name.clone(),
            table: o.table.clone(),
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}

pub fn columns_table(table: &TableInfo) -> String {
    let rows: Vec<ColumnRow> = table
        .columns
        .iter()
        .map(|c| ColumnRow {
            name: c.name.clone(),
            decl_type: c.decl_type.clone(),
            not_null: flag(c.not_null),
            primary_key: flag(c.primary_key),
            default: c.default.clone().unwrap_or_default(),
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}
