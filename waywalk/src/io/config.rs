//! Walker configuration stored under `.waywalk/config.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Walker configuration (TOML).
///
/// Edited by humans; missing fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WalkerConfig {
    /// Sleep between polls of the cursor while it is not running.
    pub poll_interval_ms: u64,

    /// Pause after every `openPage` navigation.
    pub open_page_settle_ms: u64,

    /// Mark the cursor as running when the polling loop starts, so a process
    /// restart resumes whatever the cursor points at.
    pub arm_on_start: bool,

    /// Persist the position of every step into the cursor while walking.
    pub checkpoint_spot: bool,

    /// Write the scratch store back to `pocket.json` after each attempt.
    pub persist_pockets: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3000,
            open_page_settle_ms: 3000,
            arm_on_start: true,
            checkpoint_spot: true,
            persist_pockets: false,
        }
    }
}

impl WalkerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be > 0"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn open_page_settle(&self) -> Duration {
        Duration::from_millis(self.open_page_settle_ms)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `WalkerConfig::default()`.
pub fn load_config(path: &Path) -> Result<WalkerConfig> {
    if !path.exists() {
        let cfg = WalkerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: WalkerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Write config to disk.
pub fn write_config(path: &Path, cfg: &WalkerConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}
