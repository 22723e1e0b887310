//! Read-only definition lookup.

use std::collections::HashMap;

use crate::core::ids::RefId;
use crate::core::model::{Detour, Step, Way};

/// Lookup of workflow definitions by identifier.
pub trait DefinitionStore {
    fn step(&self, id: &RefId) -> Option<&Step>;
    fn way(&self, id: &RefId) -> Option<&Way>;
    fn detour(&self, id: &RefId) -> Option<&Detour>;
}

/// In-memory definition set, keyed by identifier.
///
/// Keeps the file record order alongside the index so validation reports
/// and serialization stay deterministic.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    steps: Vec<Step>,
    ways: Vec<Way>,
    detours: Vec<Detour>,
    step_index: HashMap<RefId, usize>,
    way_index: HashMap<RefId, usize>,
    detour_index: HashMap<RefId, usize>,
}

impl Definitions {
    /// Index the given records. On duplicate ids the first record wins;
    /// [`crate::core::invariants::validate_definitions`] reports duplicates.
    pub fn new(steps: Vec<Step>, ways: Vec<Way>, detours: Vec<Detour>) -> Self {
        let step_index = index_by_id(steps.iter().map(|s| &s.id));
        let way_index = index_by_id(ways.iter().map(|w| &w.id));
        let detour_index = index_by_id(detours.iter().map(|d| &d.id));
        Self {
            steps,
            ways,
            detours,
            step_index,
            way_index,
            detour_index,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    pub fn detours(&self) -> &[Detour] {
        &self.detours
    }
}

fn index_by_id<'a>(ids: impl Iterator<Item = &'a RefId>) -> HashMap<RefId, usize> {
    let mut index = HashMap::new();
    for (pos, id) in ids.enumerate() {
        index.entry(id.clone()).or_insert(pos);
    }
    index
}

impl DefinitionStore for Definitions {
    fn step(&self, id: &RefId) -> Option<&Step> {
        self.step_index.get(id).map(|pos| &self.steps[*pos])
    }

    fn way(&self, id: &RefId) -> Option<&Way> {
        self.way_index.get(id).map(|pos| &self.ways[*pos])
    }

    fn detour(&self, id: &RefId) -> Option<&Detour> {
        self.detour_index.get(id).map(|pos| &self.detours[*pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{noop_step, way};

    #[test]
    fn looks_up_by_identifier() {
        let defs = Definitions::new(
            vec![noop_step("a"), noop_step("b")],
            vec![way("main", 1, &["Step>a", "Step>b"])],
            Vec::new(),
        );
        assert_eq!(
            defs.step(&RefId::step("b")).map(|s| s.description.as_str()),
            Some("b description")
        );
        assert!(defs.way(&RefId::way("main")).is_some());
        assert!(defs.way(&RefId::way("other")).is_none());
        assert!(defs.detour(&RefId::detour("main")).is_none());
    }

    #[test]
    fn first_duplicate_wins() {
        let mut second = noop_step("a");
        second.description = "shadowed".to_string();
        let defs = Definitions::new(vec![noop_step("a"), second], Vec::new(), Vec::new());
        assert_eq!(
            defs.step(&RefId::step("a")).map(|s| s.description.as_str()),
            Some("a description")
        );
        assert_eq!(defs.steps().len(), 2);
    }
}
