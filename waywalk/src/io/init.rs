//! Scaffolding for the `.waywalk/` workspace directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use super::config::{WalkerConfig, write_config};
use super::cursor::{InSpot, write_cursor};
use crate::core::ids::RefId;

/// Default root way named by a freshly scaffolded cursor.
pub const DEFAULT_ROOT_WAY: &str = "main";
/// Default retry budget of a freshly scaffolded cursor.
pub const DEFAULT_LIMIT: u32 = 3;

/// All canonical paths within `.waywalk/` for a project root.
#[derive(Debug, Clone)]
pub struct WalkPaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub steps_path: PathBuf,
    pub ways_path: PathBuf,
    pub detours_path: PathBuf,
    pub pockets_path: PathBuf,
    pub cursor_path: PathBuf,
    pub config_path: PathBuf,
}

impl WalkPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let data_dir = root.join(".waywalk");
        Self {
            root: root.clone(),
            data_dir: data_dir.clone(),
            steps_path: data_dir.join("step.json"),
            ways_path: data_dir.join("way.json"),
            detours_path: data_dir.join("detour.json"),
            pockets_path: data_dir.join("pocket.json"),
            cursor_path: data_dir.join("inSpot.json"),
            config_path: data_dir.join("config.toml"),
        }
    }
}

/// Options for `init_workspace`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite existing files.
    pub force: bool,
}

/// Create `.waywalk/` with empty definition files, an idle cursor and the
/// default config.
///
/// Fails if `.waywalk/` already exists unless `options.force` is set.
pub fn init_workspace(root: &Path, options: &InitOptions) -> Result<WalkPaths> {
    let paths = WalkPaths::new(root);
    if paths.data_dir.exists() && !options.force {
        return Err(anyhow!(
            "waywalk init: .waywalk already exists (use --force to overwrite)"
        ));
    }
    if paths.data_dir.exists() && !paths.data_dir.is_dir() {
        return Err(anyhow!("waywalk init: .waywalk exists but is not a directory"));
    }

    fs::create_dir_all(&paths.data_dir)
        .with_context(|| format!("create {}", paths.data_dir.display()))?;
    for path in [
        &paths.steps_path,
        &paths.ways_path,
        &paths.detours_path,
        &paths.pockets_path,
    ] {
        fs::write(path, EMPTY_LIST).with_context(|| format!("write {}", path.display()))?;
    }
    write_cursor(
        &paths.cursor_path,
        &InSpot::new(RefId::way(DEFAULT_ROOT_WAY), DEFAULT_LIMIT),
    )?;
    write_config(&paths.config_path, &WalkerConfig::default())?;

    Ok(paths)
}

const EMPTY_LIST: &str = "[]\n";
