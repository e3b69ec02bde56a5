use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::bet::MAX_STAKE;
use crate::session::MAX_BALANCE;
use crate::wheel::{SpinProfile, Wheel};

pub const CONFIG_FILE: &str = "roulette_config.json";

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "ROULETTE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub starting_balance: u64,
    pub chips: Vec<u64>,
    /// Milliseconds between spin steps. Zero runs the spin without pausing.
    pub tick_ms: u64,
    pub spin: SpinProfile,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            starting_balance: 100,
            chips: vec![1, 5, 10, 25, 100],
            tick_ms: 10,
            spin: SpinProfile::default(),
        }
    }
}

impl TableConfig {
    pub fn path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE))
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            TableConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, writing the defaults there first if it does not exist.
    pub async fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {}, writing defaults", path.display());
            TableConfig::default().save(path).await?;
        }
        Self::load(path).await
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.starting_balance <= MAX_BALANCE,
            "starting balance {} is above {MAX_BALANCE}",
            self.starting_balance
        );
        ensure!(!self.chips.is_empty(), "at least one chip is required");
        for chip in &self.chips {
            ensure!(
                (1..=MAX_STAKE).contains(chip),
                "chip {chip} is outside 1..={MAX_STAKE}"
            );
        }
        ensure!(
            self.spin.is_valid(),
            "spin profile needs a finite non-negative speed and deceleration and at least one step"
        );
        Ok(())
    }

    pub fn wheel(&self) -> Wheel {
        Wheel::with_profile(self.spin)
    }
}
