//! # Catalog Seeding and Import
//!
//! Maintenance entry point for the local database.
//!
//! ## Usage
//! ```bash
//! # Seed the default catalog if none is stored (or report what is there)
//! cargo run -p cotiza-db --bin seed
//!
//! # Overwrite the catalog with the defaults
//! cargo run -p cotiza-db --bin seed -- --reset
//!
//! # Replace the catalog with a JSON array of { sku, name, price }
//! cargo run -p cotiza-db --bin seed -- --import productos.json
//!
//! # Replace all repair quotes with an exported snapshot
//! cargo run -p cotiza-db --bin seed -- --import-repairs reparaciones.json
//!
//! # Use a specific database file
//! cargo run -p cotiza-db --bin seed -- --db ./data/cotiza.db
//! ```
//!
//! Storage keys and the default path come from `COTIZA_*` environment
//! variables; see `StoreConfig::from_env`. Log level via `RUST_LOG`.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use cotiza_db::{migrations, CatalogOrigin, Database, DbError, StoreConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    db_path: Option<PathBuf>,
    reset: bool,
    import: Option<PathBuf>,
    import_repairs: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => args.db_path = Some(value_for(&mut iter, "--db")?),
            "--reset" => args.reset = true,
            "--import" => args.import = Some(value_for(&mut iter, "--import")?),
            "--import-repairs" => {
                args.import_repairs = Some(value_for(&mut iter, "--import-repairs")?)
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(args)
}

fn value_for(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<PathBuf, String> {
    iter.next()
        .map(PathBuf::from)
        .ok_or_else(|| format!("{flag} requires a path"))
}

async fn run(args: Args) -> Result<(), DbError> {
    let mut config = StoreConfig::from_env();
    if let Some(path) = args.db_path {
        config.database_path = Some(path);
    }

    let db = Database::open(&config).await?;
    let schema = migrations::migration_status(db.pool()).await;
    info!(
        path = %config.database_path().display(),
        applied = schema.applied,
        "Database open"
    );
    let catalog = db.catalog();

    if args.reset {
        let products = catalog.reset_to_defaults().await?;
        info!(count = products.len(), "Catalog reset to defaults");
    }

    if let Some(path) = args.import {
        let payload = std::fs::read(&path)?;
        let summary = catalog.import_snapshot(&payload).await?;
        info!(path = %path.display(), count = summary.count, "Catalog imported");
    }

    if let Some(path) = args.import_repairs {
        let payload = std::fs::read(&path)?;
        let summary = db.repair_quotes().import_snapshot(&payload).await?;
        info!(path = %path.display(), count = summary.count, "Repair quotes imported");
    }

    let load = catalog.load_or_seed().await;
    match load.origin {
        CatalogOrigin::Seeded => info!(count = load.products.len(), "Default catalog seeded"),
        CatalogOrigin::Loaded => info!(count = load.products.len(), "Catalog ready"),
    }

    db.close().await;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cotiza=debug,sqlx=warn")),
        )
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            error!("{msg}");
            eprintln!("usage: seed [--db <path>] [--reset] [--import <file>] [--import-repairs <file>]");
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Seed failed");
            ExitCode::FAILURE
        }
    }
}
