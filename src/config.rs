//! Runtime configuration.
//!
//! Layered, later layers win:
//! 1. built-in defaults
//! 2. JSON file named by `BLOCKFALL_CONFIG` (all fields optional)
//! 3. `BLOCKFALL_DAS_MS`, `BLOCKFALL_ARR_MS`, `BLOCKFALL_SEED`, `BLOCKFALL_TICK_MS`
//!
//! Environment values that fail to parse are ignored.

use std::env;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::input::handler::key_release_timeout_for;
use crate::types::{DEFAULT_ARR_MS, DEFAULT_DAS_MS, TICK_MS};

pub const CONFIG_PATH_ENV: &str = "BLOCKFALL_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Hold time before movement keys auto-repeat.
    pub das_ms: u32,
    /// Auto-repeat interval; 0 moves to the wall at once.
    pub arr_ms: u32,
    /// Held keys the terminal stops reporting are dropped after this long.
    /// Unset derives a value just below `das_ms`.
    pub key_release_timeout_ms: Option<u32>,
    /// Minimum mouse drag, in terminal cells, that counts as a swipe.
    pub swipe_threshold_cells: u16,
    /// Piece sequence seed. Unset picks one from the clock.
    pub seed: Option<u32>,
    pub tick_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            das_ms: DEFAULT_DAS_MS,
            arr_ms: DEFAULT_ARR_MS,
            key_release_timeout_ms: None,
            swipe_threshold_cells: 2,
            seed: None,
            tick_ms: TICK_MS,
        }
    }
}

impl Config {
    /// Defaults, then the optional config file, then environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            Some(path) => Self::from_json_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env_with(|name| env::var(name).ok());
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse config file {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply `BLOCKFALL_*` overrides read through `lookup`.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read_u32 = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u32>().ok());

        if let Some(v) = read_u32("BLOCKFALL_DAS_MS") {
            self.das_ms = v;
        }
        if let Some(v) = read_u32("BLOCKFALL_ARR_MS") {
            self.arr_ms = v;
        }
        if let Some(v) = read_u32("BLOCKFALL_SEED") {
            self.seed = Some(v);
        }
        // A zero tick would spin the loop.
        if let Some(v) = read_u32("BLOCKFALL_TICK_MS").filter(|v| *v > 0) {
            self.tick_ms = v;
        }
    }

    /// Auto-release timeout in effect for terminals without release events.
    pub fn key_release_timeout(&self) -> u32 {
        self.key_release_timeout_ms
            .unwrap_or_else(|| key_release_timeout_for(self.das_ms))
    }

    /// The configured seed, or one derived from the wall clock.
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
    }
}
