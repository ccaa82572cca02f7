//! Chapter and problem catalog for video solutions to I.E. Irodov's
//! "Problems in General Physics".
//!
//! - [`db`]: PostgreSQL storage for chapters and problems
//! - [`server`]: Axum HTTP API over the catalog
//! - [`seed`]: TOML catalog files for seeding
//! - [`prom_metrics`]: Prometheus registry

pub mod db;
pub mod prom_metrics;
pub mod seed;
pub mod server;
