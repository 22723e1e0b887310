//! I/O helpers: definition files, cursor, config and the page driver.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub mod config;
pub mod cursor;
pub mod definitions;
pub mod init;
pub mod page;

/// Write `contents` via a temp file and rename, creating parent directories.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);
    fs::write(tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
