//! Terminal output for the CLI

pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, header, info, phase, success, summary_row, timing, warn};
pub use progress::Spinner;
pub use table::{report_table, stats_table};
pub use theme::{theme, Theme};
