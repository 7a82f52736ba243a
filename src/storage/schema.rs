//! Database schema definitions
//!
//! The loader only ever issues four statement shapes: drop table, create
//! entity table, create edge table and insert row. All of them are built
//! here as plain strings so they can be inspected without a connection.

use crate::column::Column;

/// Name of the surrogate-key primary key column on every entity table
pub const PRIMARY_KEY: &str = "id";

/// Double-quote an identifier for SQLite
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQL to drop a table left over from a previous run
pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

/// SQL to create an entity table: surrogate key first, then one column per descriptor
pub fn create_table(table: &str, columns: &[Column]) -> String {
    let mut defs = vec![format!("{} TEXT PRIMARY KEY NOT NULL", quote_ident(PRIMARY_KEY))];
    defs.extend(columns.iter().map(Column::sql_def));
    format!("CREATE TABLE {} ({})", quote_ident(table), defs.join(", "))
}

/// Column names of an edge table joining `source` to `target`
pub fn edge_columns(source: &str, target: &str) -> (String, String) {
    (format!("{}_id", source), format!("{}_id", target))
}

/// SQL to create an edge table.
///
/// Deleting a source row removes its edges; deleting a target row is
/// blocked while edges still point at it. Both sides follow key updates.
pub fn create_edge_table(table: &str, source: &str, target: &str) -> String {
    let (source_col, target_col) = edge_columns(source, target);
    format!(
        "CREATE TABLE {} (\
         {} TEXT NOT NULL REFERENCES {} ({}) ON UPDATE CASCADE ON DELETE CASCADE, \
         {} TEXT NOT NULL REFERENCES {} ({}) ON UPDATE CASCADE)",
        quote_ident(table),
        quote_ident(&source_col),
        quote_ident(source),
        quote_ident(PRIMARY_KEY),
        quote_ident(&target_col),
        quote_ident(target),
        quote_ident(PRIMARY_KEY),
    )
}

/// SQL to insert one row with positional parameters `?1..?n`
pub fn insert_row<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(c.as_ref())).collect();
    let params: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names.join(", "),
        params.join(", ")
    )
}
