//! Subcommand bodies, kept out of `main.rs` so argument parsing stays
//! readable. Each one opens its own pool and drives it on the runtime
//! created in `main`.

use anyhow::{Context, Result};
use irodov_catalog::db::Database;
use irodov_catalog::seed::SeedCatalog;
use irodov_catalog::server;
use std::path::Path;
use tracing::info;

fn connect(rt: &tokio::runtime::Runtime, database_url: &str, max_connections: u32) -> Result<Database> {
    rt.block_on(Database::connect(database_url, max_connections))
        .context("failed to connect to the catalog database")
}

/// Migrate, then serve until a shutdown signal arrives.
pub fn run_serve(
    rt: &tokio::runtime::Runtime,
    database_url: &str,
    max_connections: u32,
    bind: &str,
    port: u16,
) -> Result<()> {
    let database = connect(rt, database_url, max_connections)?;
    rt.block_on(database.migrate())?;
    rt.block_on(server::run(bind, port, database))
}

pub fn run_migrate(
    rt: &tokio::runtime::Runtime,
    database_url: &str,
    max_connections: u32,
) -> Result<()> {
    let database = connect(rt, database_url, max_connections)?;
    rt.block_on(database.migrate())?;
    info!("migrations applied");
    Ok(())
}

/// Import a TOML catalog. The file is parsed and validated before the
/// database is touched, so a bad file never leaves a partial import.
pub fn run_seed(
    rt: &tokio::runtime::Runtime,
    database_url: &str,
    max_connections: u32,
    file: Option<&Path>,
    reset: bool,
) -> Result<()> {
    let catalog = SeedCatalog::load(file)?;
    info!(
        source = %file.map(|p| p.display().to_string()).unwrap_or_else(|| "bundled".into()),
        chapters = catalog.chapters.len(),
        problems = catalog.problem_count(),
        reset,
        "seeding catalog"
    );

    let database = connect(rt, database_url, max_connections)?;
    rt.block_on(database.migrate())?;
    let summary = rt.block_on(database.seed_catalog(&catalog, reset))?;
    info!(
        chapters = summary.chapters,
        problems = summary.problems,
        "catalog seeded"
    );
    Ok(())
}
