//! Resume cursor storage (`.waywalk/inSpot.json`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::ids::RefId;
use crate::core::spot::Spot;

/// Persisted run cursor: whether a walk should run, with which retry budget,
/// from which root way, and where to resume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InSpot {
    pub is_run: bool,
    pub limit: u32,
    pub way_id: RefId,
    #[serde(default)]
    pub spot: Spot,
}

impl InSpot {
    pub fn new(way_id: RefId, limit: u32) -> Self {
        Self {
            is_run: false,
            limit,
            way_id,
            spot: Spot::default(),
        }
    }
}

/// Load the cursor from disk.
pub fn load_cursor(path: &Path) -> Result<InSpot> {
    debug!(path = %path.display(), "loading cursor");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read cursor {}", path.display()))?;
    let cursor: InSpot = serde_json::from_str(&contents)
        .with_context(|| format!("parse cursor {}", path.display()))?;
    debug!(is_run = cursor.is_run, way = %cursor.way_id, spot = %cursor.spot, "cursor loaded");
    Ok(cursor)
}

/// Atomically write the cursor to disk (temp file + rename).
pub fn write_cursor(path: &Path, cursor: &InSpot) -> Result<()> {
    debug!(path = %path.display(), is_run = cursor.is_run, spot = %cursor.spot, "writing cursor");
    let mut buf = serde_json::to_string_pretty(cursor)?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}

/// Read-modify-write: apply `change` to the stored cursor and persist it.
pub fn update_cursor(path: &Path, change: impl FnOnce(&mut InSpot)) -> Result<InSpot> {
    let mut cursor = load_cursor(path)?;
    change(&mut cursor);
    write_cursor(path, &cursor)?;
    Ok(cursor)
}

/// Set only the running flag, keeping every other field.
pub fn set_running(path: &Path, is_run: bool) -> Result<InSpot> {
    update_cursor(path, |cursor| cursor.is_run = is_run)
}
