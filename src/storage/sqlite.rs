//! SQLite storage implementation

use std::path::Path;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, ErrorCode, Transaction, params_from_iter};
use crate::{Result, Error};
use crate::catalog::EdgeDef;
use crate::column::Column;
use crate::record::EntityRecord;
use crate::registry::IdentifierRegistry;
use super::schema;

/// SQLite-backed target store for the import
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::configure(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Start a load session. Nothing it does is visible until [`LoadSession::commit`].
    pub fn session(&mut self) -> Result<LoadSession<'_>> {
        let tx = self.conn.transaction()?;
        Ok(LoadSession { tx })
    }

    /// Raw connection, for read-back queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Check whether a table exists
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Count the rows of a table
    pub fn count_rows(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", schema::quote_ident(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Row counts for the given tables; tables that do not exist are skipped
    pub fn stats(&self, tables: &[&str]) -> Result<DbStats> {
        let mut stats = DbStats::default();
        for table in tables {
            if self.table_exists(table)? {
                stats.tables.push((table.to_string(), self.count_rows(table)?));
            }
        }
        Ok(stats)
    }
}

/// One transaction's worth of schema and data statements
pub struct LoadSession<'a> {
    tx: Transaction<'a>,
}

impl LoadSession<'_> {
    /// Drop a table if a previous run left it behind
    pub fn drop_table(&self, table: &str) -> Result<()> {
        let sql = schema::drop_table(table);
        tracing::debug!("{}", sql);
        self.tx.execute(&sql, [])?;
        Ok(())
    }

    /// (Re)create an entity table and insert one row per record, in record order.
    ///
    /// Every row is projected before anything is written, so a record that
    /// fails projection leaves the table without rows.
    pub fn load_table(
        &self,
        table: &str,
        columns: &[Column],
        records: &[EntityRecord],
        registry: &mut IdentifierRegistry,
    ) -> Result<usize> {
        let rows = project_rows(columns, records, registry)?;

        self.drop_table(table)?;
        self.create(table, &schema::create_table(table, columns))?;

        let mut names = vec![schema::PRIMARY_KEY];
        names.extend(columns.iter().map(|c| c.name));
        let insert = schema::insert_row(table, &names);
        tracing::debug!("{}", insert);

        let mut stmt = self.tx.prepare_cached(&insert)?;
        for row in &rows {
            stmt.execute(params_from_iter(row.iter()))
                .map_err(|e| classify_insert(table, e))?;
        }

        tracing::info!("Loaded {} rows into {}", rows.len(), table);
        Ok(rows.len())
    }

    /// (Re)create an edge table and insert one row per extracted link.
    ///
    /// Rows follow record order, then the order of each record's target list.
    /// Repeated pairs are inserted as-is.
    pub fn load_edges(
        &self,
        edge: &EdgeDef,
        records: &[EntityRecord],
        registry: &mut IdentifierRegistry,
    ) -> Result<usize> {
        let mut pairs = Vec::new();
        for record in records {
            let source_key = registry.resolve(&record.url).to_key_string();
            for target in (edge.extract)(record)? {
                pairs.push((source_key.clone(), registry.resolve(&target).to_key_string()));
            }
        }

        self.drop_table(edge.name)?;
        self.create(
            edge.name,
            &schema::create_edge_table(edge.name, edge.source_table, edge.target_table),
        )?;

        let (source_col, target_col) = schema::edge_columns(edge.source_table, edge.target_table);
        let insert = schema::insert_row(edge.name, &[source_col, target_col]);
        tracing::debug!("{}", insert);

        let mut stmt = self.tx.prepare_cached(&insert)?;
        for (source, target) in &pairs {
            stmt.execute([source, target])
                .map_err(|e| classify_insert(edge.name, e))?;
        }

        tracing::info!("Loaded {} edges into {}", pairs.len(), edge.name);
        Ok(pairs.len())
    }

    /// Make everything done in this session visible
    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn create(&self, table: &str, sql: &str) -> Result<()> {
        tracing::debug!("{}", sql);
        self.tx
            .execute(sql, [])
            .map_err(|e| Error::SchemaConflict {
                table: table.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

/// Project every record into `(surrogate key, column values...)`
pub fn project_rows(
    columns: &[Column],
    records: &[EntityRecord],
    registry: &mut IdentifierRegistry,
) -> Result<Vec<Vec<SqlValue>>> {
    records
        .iter()
        .map(|record| {
            let mut row = Vec::with_capacity(columns.len() + 1);
            row.push(SqlValue::Text(registry.resolve(&record.url).to_key_string()));
            for column in columns {
                row.push(column.value(record, registry)?);
            }
            Ok(row)
        })
        .collect()
}

/// Constraint failures on insert are integrity problems in the source data
fn classify_insert(table: &str, err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(code, msg) if code.code == ErrorCode::ConstraintViolation => {
            Error::DataIntegrity(format!(
                "{}: {}",
                table,
                msg.unwrap_or_else(|| code.to_string())
            ))
        }
        other => Error::Storage(other),
    }
}

/// Database statistics
#[derive(Debug, Clone, Default)]
pub struct DbStats {
    pub tables: Vec<(String, usize)>,
}

impl DbStats {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|(_, rows)| rows).sum()
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for (table, rows) in &self.tables {
            writeln!(f, "  {}: {}", table, rows)?;
        }
        write!(f, "  Total: {}", self.total_rows())
    }
}
