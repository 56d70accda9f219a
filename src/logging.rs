//! Diagnostics setup.
//!
//! Stdout is the game screen, so logs only go to a file and only when
//! `BLOCKFALL_LOG_FILE` is set. The filter comes from `RUST_LOG` and defaults
//! to `info`.

use std::env;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_ENV: &str = "BLOCKFALL_LOG_FILE";

/// Install the file subscriber if requested. Returns whether one was installed.
pub fn init_from_env() -> Result<bool> {
    match env::var_os(LOG_FILE_ENV).filter(|p| !p.is_empty()) {
        Some(path) => {
            init_file(Path::new(&path))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub fn init_file(path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("install tracing subscriber: {e}"))?;

    tracing::info!(path = %path.display(), "logging to file");
    Ok(())
}
