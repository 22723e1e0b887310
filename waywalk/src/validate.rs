//! `waywalk validate`: static checks over the definition files and cursor.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::defs::DefinitionStore;
use crate::core::invariants::{check_references, traversal_cycles, validate_definitions};
use crate::io::cursor::load_cursor;
use crate::io::definitions::{load_definitions_unchecked, load_pockets};
use crate::io::init::WalkPaths;

/// Counts and problems found in a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub steps: usize,
    pub ways: usize,
    pub detours: usize,
    pub pockets: usize,
    pub errors: Vec<String>,
    /// Findings that do not stop a walk, such as ways that loop through a
    /// detour.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Load every file under `.waywalk/` and collect invariant violations.
///
/// Unreadable or unparsable files are returned as errors; semantic problems
/// are collected into the report. Dangling references count as errors here
/// even though a walk only fails on one when it reaches it. Traversal cycles
/// are warnings: a detour can end the loop at runtime.
pub fn validate_workspace(root: &Path) -> Result<ValidationReport> {
    let paths = WalkPaths::new(root);
    let defs = load_definitions_unchecked(&paths)?;
    let pockets = load_pockets(&paths.pockets_path)?;
    let cursor = load_cursor(&paths.cursor_path).context("load cursor")?;

    let mut errors = validate_definitions(&defs);
    errors.extend(check_references(&defs));
    if defs.way(&cursor.way_id).is_none() {
        errors.push(format!("cursor: unknown root way {}", cursor.way_id));
    }

    Ok(ValidationReport {
        steps: defs.steps().len(),
        ways: defs.ways().len(),
        detours: defs.detours().len(),
        pockets: pockets.len(),
        errors,
        warnings: traversal_cycles(&defs),
    })
}
