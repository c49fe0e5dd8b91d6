//! Run configuration: grid size, seed, contradiction policy, budget and pins.
//!
//! Loaded from `generation_config.json` with support for an environment
//! variable override.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use crate::engine::{ContradictionPolicy, RunBudget, RunOptions};

pub const BUILTIN_GENERATION_CONFIG: &str = include_str!("data/generation_config.json");

pub const CONFIG_PATH_ENV: &str = "TERRAIN_WFC_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub on_contradiction: ContradictionPolicy,
    pub max_steps: Option<u64>,
    pub time_limit_ms: Option<u64>,
    /// Rule set file; falls back to the environment override, then the builtin set.
    pub rules_path: Option<PathBuf>,
    pub pins: Vec<PinConfig>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 15,
            seed: 42,
            on_contradiction: ContradictionPolicy::default(),
            max_steps: None,
            time_limit_ms: None,
            rules_path: None,
            pins: Vec::new(),
        }
    }
}

/// Cell fixed to a category before the first random collapse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PinConfig {
    pub x: u32,
    pub y: u32,
    pub category: String,
}

#[derive(Debug, Error)]
pub enum GenerationConfigError {
    #[error("failed to parse generation config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read generation config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("grid dimensions must be positive, got {width}x{height}")]
    Dimensions { width: u32, height: u32 },
}

impl GenerationConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_GENERATION_CONFIG)
                .expect("builtin generation config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, GenerationConfigError> {
        let config: GenerationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, GenerationConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| GenerationConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), GenerationConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(GenerationConfigError::Dimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            on_contradiction: self.on_contradiction,
            budget: RunBudget {
                max_steps: self.max_steps,
                time_limit: self.time_limit_ms.map(Duration::from_millis),
            },
        }
    }
}

/// Load generation config from environment or builtin defaults.
pub fn load_generation_config_from_env() -> (Arc<GenerationConfig>, Option<PathBuf>) {
    if let Some(path) = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from) {
        match GenerationConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "terrain_wfc::config",
                    path = %path.display(),
                    width = config.width,
                    height = config.height,
                    seed = config.seed,
                    "generation_config.loaded=file"
                );
                return (Arc::new(config), Some(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "terrain_wfc::config",
                    path = %path.display(),
                    error = %err,
                    "generation_config.load_failed"
                );
            }
        }
    }

    let config = GenerationConfig::builtin();
    tracing::info!(
        target: "terrain_wfc::config",
        "generation_config.loaded=builtin"
    );
    (config, None)
}
