//! File-backed definition store: `step.json`, `way.json`, `detour.json` and
//! `pocket.json` under `.waywalk/`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::defs::Definitions;
use crate::core::invariants::validate_definitions;
use crate::core::model::{Detour, Pocket, Step, Way};
use crate::core::pockets::Pockets;
use crate::io::init::WalkPaths;

/// Load steps, ways and detours and check their load-time invariants.
///
/// References are not resolved here; the walker reports a missing record
/// when it reaches one.
pub fn load_definitions(paths: &WalkPaths) -> Result<Definitions> {
    let defs = load_definitions_unchecked(paths)?;
    let errors = validate_definitions(&defs);
    if !errors.is_empty() {
        return Err(anyhow!(
            "definition invariants failed: {}",
            errors.join("; ")
        ));
    }
    Ok(defs)
}

/// Load steps, ways and detours without invariant checks.
pub fn load_definitions_unchecked(paths: &WalkPaths) -> Result<Definitions> {
    let steps: Vec<Step> = read_records(&paths.steps_path)?;
    let ways: Vec<Way> = read_records(&paths.ways_path)?;
    let detours: Vec<Detour> = read_records(&paths.detours_path)?;
    debug!(
        steps = steps.len(),
        ways = ways.len(),
        detours = detours.len(),
        "definitions loaded"
    );
    Ok(Definitions::new(steps, ways, detours))
}

/// Load the seed pockets.
pub fn load_pockets(path: &Path) -> Result<Vec<Pocket>> {
    read_records(path)
}

/// Persist the scratch store, sorted by name.
pub fn write_pockets(path: &Path, pockets: &Pockets) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(&pockets.to_records())?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}

/// Write a full definition set (used for scaffolding and fixtures).
pub fn write_definitions(
    paths: &WalkPaths,
    steps: &[Step],
    ways: &[Way],
    detours: &[Detour],
) -> Result<()> {
    write_records(&paths.steps_path, steps)?;
    write_records(&paths.ways_path, ways)?;
    write_records(&paths.detours_path, detours)
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(records)?;
    buf.push('\n');
    fs::write(path, buf).with_context(|| format!("write {}", path.display()))
}
