//! Optional `prisma.toml` configuration.
//!
//! Every key may be omitted and falls back to the default below. An explicit
//! `--config` path must exist; otherwise `./prisma.toml` is used when present.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::MAX_GRID_BYTES;
use crate::processor::source;

pub const DEFAULT_CONFIG_FILE: &str = "prisma.toml";

const CONFIG_LIMIT: u64 = 64 * 1024;
const MAX_SCALE: u32 = 64;
const MAX_VIEWPORT: i32 = 16384;

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WorldConfig {
    /// Integer tile-to-screen magnification.
    #[serde(default = "default_scale")]
    pub scale: u32,
    /// Pixels the actor moves per tick while steered.
    #[serde(default = "default_move_delta")]
    pub move_delta: i32,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: i32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: i32,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    #[serde(default = "default_max_grid_bytes")]
    pub max_grid_bytes: u64,
}

// ── Defaults ──

fn default_scale() -> u32 {
    4
}
fn default_move_delta() -> i32 {
    8
}
fn default_viewport_width() -> i32 {
    640
}
fn default_viewport_height() -> i32 {
    480
}
fn default_max_grid_bytes() -> u64 {
    MAX_GRID_BYTES
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            scale: default_scale(),
            move_delta: default_move_delta(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_grid_bytes: default_max_grid_bytes(),
        }
    }
}

// ── Loading ──

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `explicit` if given, else `./prisma.toml` if it exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !p.is_file() {
                    log::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Config::default());
                }
                p
            }
        };

        let text = source::read_text(&path, CONFIG_LIMIT)
            .with_context(|| format!("Reading {}", path.display()))?;
        let cfg = Self::from_toml(&text)
            .with_context(|| format!("Parsing {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let w = &self.world;
        anyhow::ensure!(
            (1..=MAX_SCALE).contains(&w.scale),
            "world.scale must be between 1 and {MAX_SCALE}"
        );
        anyhow::ensure!(w.move_delta >= 0, "world.move_delta must not be negative");
        anyhow::ensure!(
            (1..=MAX_VIEWPORT).contains(&w.viewport_width)
                && (1..=MAX_VIEWPORT).contains(&w.viewport_height),
            "viewport size must be between 1 and {MAX_VIEWPORT} pixels"
        );
        Ok(())
    }
}
