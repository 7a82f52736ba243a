//! Holoload CLI - import the catalog API into SQLite

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use holoload::catalog::LoadPlan;
use holoload::config::{self, HololoadConfig};
use holoload::fetch::{CachedSource, HttpSource, ResourceSource};
use holoload::storage::SqliteStore;
use holoload::ui::{self, Icons};
use holoload::Importer;
use indicatif::HumanDuration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "holoload")]
#[command(version)]
#[command(about = "Load the paginated catalog API into a relational SQLite schema")]
#[command(long_about = r#"
Holoload fetches every catalog collection (planets, species, people, films,
starships, vehicles), swaps source URLs for surrogate keys and replaces the
target database with entity tables plus many-to-many edge tables.

Example usage:
  holoload init
  holoload import --database swapi.db
  holoload import --no-cache --base-url http://localhost:8000/api
  holoload stats --database swapi.db
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all collections and replace the database contents
    Import {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Base URL of the catalog API
        #[arg(short, long)]
        base_url: Option<String>,

        /// Directory holding cached collections
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Always fetch from the network and leave the cache untouched
        #[arg(long)]
        no_cache: bool,
    },

    /// Show row counts of the imported tables
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let file_config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Import { database, base_url, cache_dir, no_cache } => {
            let settings = file_config
                .merge(HololoadConfig {
                    database: database.map(|p| p.to_string_lossy().into_owned()),
                    base_url,
                    cache_dir: cache_dir.map(|p| p.to_string_lossy().into_owned()),
                    cache: no_cache.then_some(false),
                })
                .resolve();

            ui::header("Importing catalog");
            ui::info("Source", &settings.base_url);
            ui::info("Database", &settings.database.display().to_string());
            if settings.cache {
                ui::info("Cache", &settings.cache_dir.display().to_string());
            }

            let http = HttpSource::new()?;
            let source: Box<dyn ResourceSource> = if settings.cache {
                Box::new(CachedSource::new(http, &settings.cache_dir))
            } else {
                Box::new(http)
            };

            let importer = Importer::new(&settings.base_url);

            ui::phase(Icons::GLOBE, "Fetching collections");
            let spinner = ui::Spinner::new("Fetching...");
            let data = match importer.fetch_all(&*source) {
                Ok(data) => data,
                Err(e) => {
                    spinner.finish_and_clear();
                    ui::error("Fetch failed; database left unchanged");
                    return Err(e.into());
                }
            };
            spinner.finish_with_message("Done");

            ui::phase(Icons::DATABASE, "Replacing tables");
            config::ensure_db_dir(&settings.database)?;
            let mut store = SqliteStore::open(&settings.database)?;
            let report = match importer.load(&mut store, &data) {
                Ok(report) => report,
                Err(e) => {
                    ui::error("Import aborted; no changes were committed");
                    return Err(e.into());
                }
            };

            println!("{}", ui::report_table(&report));
            ui::summary_row("Entity rows:", &report.entity_rows().to_string());
            ui::summary_row("Edge rows:", &report.edge_rows().to_string());
            ui::summary_row("Surrogate keys:", &report.keys_issued.to_string());
            ui::timing(&format!("Loaded in {}", HumanDuration(report.elapsed)));
            ui::success("Import complete!");
        }

        Commands::Stats { database } => {
            let settings = file_config
                .merge(HololoadConfig {
                    database: database.map(|p| p.to_string_lossy().into_owned()),
                    ..Default::default()
                })
                .resolve();

            if !settings.database.exists() {
                ui::warn(&format!("No database at {}", settings.database.display()));
                return Ok(());
            }

            let store = SqliteStore::open(&settings.database)?;
            let stats = store.stats(&LoadPlan::catalog().table_names())?;

            println!("{} Holoload Statistics ({})", Icons::STATS, settings.database.display());
            if stats.tables.is_empty() {
                ui::warn("No imported tables found. Run `holoload import` first.");
            } else {
                println!("{}", ui::stats_table(&stats));
                ui::summary_row("Total rows:", &stats.total_rows().to_string());
            }
        }

        Commands::Init { force } => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            config::write_config(&path, &HololoadConfig::defaults(), force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}
