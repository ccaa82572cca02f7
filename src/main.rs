//! # Main: CLI Entry Point
//!
//! Routes CLI subcommands to the catalog server, the migrator and the seeder.
//! Handles shared concerns: `.env` loading, structured logging and the
//! database connection settings every subcommand needs.
//!
//! ## Subcommands
//!
//! - `serve`: apply migrations, then run the HTTP API.
//! - `migrate`: apply pending migrations and exit.
//! - `seed`: import a TOML catalog (the bundled Irodov catalog by default).
//!
//! ## Global Options
//!
//! - `--database-url` / `DATABASE_URL`: PostgreSQL connection for the catalog.
//! - `--max-connections` / `DATABASE_MAX_CONNECTIONS`: pool size (default 5).

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "irodov-catalog",
    about = "Catalog of Irodov physics problems and their video solutions"
)]
struct Cli {
    /// PostgreSQL connection URL (or set DATABASE_URL env var)
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, global = true, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the catalog HTTP API (applies migrations first)
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 3001)]
        port: u16,

        /// Address to bind
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
        bind: String,
    },
    /// Apply pending database migrations
    Migrate,
    /// Import chapters and problems from a TOML catalog
    Seed {
        /// Catalog file (defaults to the bundled Irodov catalog)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Delete every existing chapter and problem before importing
        #[arg(long)]
        reset: bool,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for container deployments, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    let database_url = cli.database_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("DATABASE_URL is required (set via --database-url or env)")
    })?;
    let rt = tokio::runtime::Runtime::new()?;

    match &cli.command {
        Commands::Serve { port, bind } => {
            cli::run_serve(&rt, database_url, cli.max_connections, bind, *port)
        }
        Commands::Migrate => cli::run_migrate(&rt, database_url, cli.max_connections),
        Commands::Seed { file, reset } => cli::run_seed(
            &rt,
            database_url,
            cli.max_connections,
            file.as_deref(),
            *reset,
        ),
    }
}
