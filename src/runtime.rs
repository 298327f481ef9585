//! Runtime helpers shared by the binaries.
//!
//! Centralizes environment lookups and logging setup so the CLI stays a thin
//! argument parser.

use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the default catalog file for `role-demo`.
pub const CATALOG_ENV: &str = "ROLECRAFT_CATALOG";

/// Catalog path from `ROLECRAFT_CATALOG`, ignoring empty values.
pub fn catalog_path_from_env() -> Option<PathBuf> {
    env::var_os(CATALOG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Install the stderr tracing subscriber. `RUST_LOG` overrides the default
/// `warn` filter. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
