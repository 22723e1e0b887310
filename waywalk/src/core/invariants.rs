//! Static checks over a loaded definition set.
//!
//! Checks are split by who needs them. [`validate_definitions`] guards every
//! load: a set that fails it cannot be indexed or walked sensibly.
//! [`check_references`] and [`traversal_cycles`] are reports for
//! `waywalk validate`. A walk resolves references as it reaches them, so a
//! dangling id in a branch never taken is harmless, and a way reached again
//! through a detour is how scenarios loop on data.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::core::defs::{DefinitionStore, Definitions};
use crate::core::ids::{RefId, RefKind};
use crate::core::model::DEFAULT_ENTRY;

/// Validate load-time invariants and return human-readable errors.
///
/// Checked:
/// - ids are unique per kind and carry the prefix of their collection,
/// - every way repeats at least once,
/// - detours have at most one `default` entry and no repeated values.
pub fn validate_definitions(defs: &Definitions) -> Vec<String> {
    let mut errors = Vec::new();
    check_ids(
        defs.steps().iter().map(|s| &s.id),
        RefKind::Step,
        &mut errors,
    );
    check_ids(defs.ways().iter().map(|w| &w.id), RefKind::Way, &mut errors);
    check_ids(
        defs.detours().iter().map(|d| &d.id),
        RefKind::Detour,
        &mut errors,
    );

    for way in defs.ways() {
        if way.repeat == 0 {
            errors.push(format!("{}: repeat must be >= 1", way.id));
        }
    }

    for detour in defs.detours() {
        let defaults = detour
            .entries
            .iter()
            .filter(|entry| entry.value == DEFAULT_ENTRY)
            .count();
        if defaults > 1 {
            errors.push(format!("{}: more than one default entry", detour.id));
        }
        let mut seen = HashSet::new();
        for entry in &detour.entries {
            if entry.value != DEFAULT_ENTRY && !seen.insert(entry.value.as_str()) {
                errors.push(format!(
                    "{}: duplicate entry value '{}'",
                    detour.id, entry.value
                ));
            }
        }
    }
    errors
}

/// Every catch list, way step and detour entry that names a missing record.
pub fn check_references(defs: &Definitions) -> Vec<String> {
    let mut errors = Vec::new();
    for step in defs.steps() {
        for target in &step.catch {
            check_reference(defs, &step.id, target, &mut errors);
        }
    }
    for way in defs.ways() {
        for target in &way.steps {
            check_reference(defs, &way.id, target, &mut errors);
        }
    }
    for detour in defs.detours() {
        for entry in &detour.entries {
            for target in &entry.steps {
                check_reference(defs, &detour.id, target, &mut errors);
            }
        }
    }
    errors
}

/// Ways and detours that can reach themselves through way or detour edges.
///
/// Catch edges are bounded by the retry budget and are not followed.
pub fn traversal_cycles(defs: &Definitions) -> Vec<String> {
    find_cycles(defs)
        .into_iter()
        .map(|id| format!("traversal cycle through {id}"))
        .collect()
}

fn check_ids<'a>(ids: impl Iterator<Item = &'a RefId>, kind: RefKind, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for id in ids {
        if id.kind() != kind {
            errors.push(format!("{id}: expected a {kind} identifier"));
        }
        if !seen.insert(id) {
            errors.push(format!("duplicate id {id}"));
        }
    }
}

fn check_reference(defs: &Definitions, owner: &RefId, target: &RefId, errors: &mut Vec<String>) {
    let exists = match target.kind() {
        RefKind::Step => defs.step(target).is_some(),
        RefKind::Way => defs.way(target).is_some(),
        RefKind::Detour => defs.detour(target).is_some(),
    };
    if !exists {
        errors.push(format!("{owner}: unknown reference {target}"));
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

fn find_cycles(defs: &Definitions) -> BTreeSet<RefId> {
    let mut edges: HashMap<&RefId, Vec<&RefId>> = HashMap::new();
    for way in defs.ways() {
        edges
            .entry(&way.id)
            .or_default()
            .extend(way.steps.iter().filter(|id| id.kind() != RefKind::Step));
    }
    for detour in defs.detours() {
        let targets = edges.entry(&detour.id).or_default();
        for entry in &detour.entries {
            targets.extend(entry.steps.iter().filter(|id| id.kind() != RefKind::Step));
        }
    }

    let mut marks: HashMap<&RefId, Mark> = HashMap::new();
    let mut cycles = BTreeSet::new();
    let mut roots: Vec<&RefId> = edges.keys().copied().collect();
    roots.sort();
    for root in roots {
        visit(root, &edges, &mut marks, &mut cycles);
    }
    cycles
}

fn visit<'a>(
    node: &'a RefId,
    edges: &HashMap<&'a RefId, Vec<&'a RefId>>,
    marks: &mut HashMap<&'a RefId, Mark>,
    cycles: &mut BTreeSet<RefId>,
) {
    match marks.get(node) {
        Some(Mark::Done) => return,
        Some(Mark::Visiting) => {
            cycles.insert(node.clone());
            return;
        }
        None => {}
    }
    marks.insert(node, Mark::Visiting);
    if let Some(targets) = edges.get(node) {
        for target in targets {
            visit(*target, edges, marks, cycles);
        }
    }
    marks.insert(node, Mark::Done);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{detour, noop_step, step_with_catch, way};

    #[test]
    fn valid_definitions_have_no_errors() {
        let defs = Definitions::new(
            vec![noop_step("a"), step_with_catch("b", &["Step>a"])],
            vec![
                way("main", 1, &["Step>a", "Way>sub", "Detour>pick"]),
                way("sub", 2, &["Step>b"]),
            ],
            vec![detour(
                "pick",
                "choice",
                &[("x", &["Step>a"]), ("default", &["Way>sub"])],
            )],
        );
        assert!(validate_definitions(&defs).is_empty());
        assert!(check_references(&defs).is_empty());
        assert!(traversal_cycles(&defs).is_empty());
    }

    #[test]
    fn reports_structural_errors() {
        let defs = Definitions::new(
            vec![noop_step("a"), noop_step("a")],
            vec![way("main", 0, &[])],
            vec![detour(
                "pick",
                "choice",
                &[("x", &[]), ("x", &[]), ("default", &[]), ("default", &[])],
            )],
        );
        let errors = validate_definitions(&defs);
        assert!(errors.iter().any(|e| e.contains("duplicate id Step>a")));
        assert!(errors.iter().any(|e| e.contains("repeat must be >= 1")));
        assert!(errors.iter().any(|e| e.contains("more than one default entry")));
        assert!(errors.iter().any(|e| e.contains("duplicate entry value 'x'")));
    }

    #[test]
    fn dangling_references_are_reported_separately() {
        let defs = Definitions::new(
            vec![step_with_catch("b", &["Step>ghost"])],
            vec![way("main", 1, &["Way>missing"])],
            vec![detour("pick", "choice", &[("x", &["Detour>gone"])])],
        );
        assert!(validate_definitions(&defs).is_empty());
        let errors = check_references(&defs);
        assert_eq!(
            errors,
            vec![
                "Step>b: unknown reference Step>ghost".to_string(),
                "Way>main: unknown reference Way>missing".to_string(),
                "Detour>pick: unknown reference Detour>gone".to_string(),
            ]
        );
    }

    #[test]
    fn reports_wrong_kind_in_collection() {
        let mut misplaced = noop_step("a");
        misplaced.id = RefId::way("a");
        let defs = Definitions::new(vec![misplaced], Vec::new(), Vec::new());
        let errors = validate_definitions(&defs);
        assert_eq!(errors, vec!["Way>a: expected a Step identifier".to_string()]);
    }

    #[test]
    fn detects_way_cycles_but_not_catch_loops() {
        let defs = Definitions::new(
            vec![step_with_catch("retry", &["Step>retry"])],
            vec![
                way("a", 1, &["Step>retry", "Detour>d"]),
                way("b", 1, &["Way>a"]),
            ],
            vec![detour("d", "p", &[("default", &["Way>b"])])],
        );
        assert!(validate_definitions(&defs).is_empty());
        let cycles = traversal_cycles(&defs);
        assert!(cycles.iter().any(|e| e.starts_with("traversal cycle through")));
        assert!(!cycles.iter().any(|e| e.contains("Step>retry")));
    }
}
