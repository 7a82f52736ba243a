use crate::import::{ImportReport, TableKind};
use crate::storage::DbStats;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Table")]
    table: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Rows")]
    rows: usize,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Table")]
    table: String,
    #[tabled(rename = "Rows")]
    rows: usize,
}

/// Per-table row counts of a finished import
pub fn report_table(report: &ImportReport) -> String {
    let rows: Vec<ReportRow> = report
        .tables
        .iter()
        .map(|t| ReportRow {
            table: t.name.clone(),
            kind: match t.kind {
                TableKind::Entity => "entity",
                TableKind::Edge => "edge",
            },
            rows: t.rows,
        })
        .collect();
    render(&rows)
}

/// Per-table row counts of the current store
pub fn stats_table(stats: &DbStats) -> String {
    let rows: Vec<StatsRow> = stats
        .tables
        .iter()
        .map(|(table, rows)| StatsRow {
            table: table.clone(),
            rows: *rows,
        })
        .collect();
    render(&rows)
}

fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}
