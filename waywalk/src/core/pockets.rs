//! Scratch store: named string cells shared by steps during a walk.

use std::collections::HashMap;

use crate::core::model::Pocket;

/// Name -> content map with upsert writes.
///
/// One instance is owned by the caller of a walk and lent to the walker and
/// actions by `&mut`; nothing else holds it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pockets {
    cells: HashMap<String, String>,
}

impl Pockets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, later records overwriting earlier ones.
    pub fn seeded(records: impl IntoIterator<Item = Pocket>) -> Self {
        let mut pockets = Self::new();
        pockets.seed(records);
        pockets
    }

    pub fn seed(&mut self, records: impl IntoIterator<Item = Pocket>) {
        for record in records {
            self.put_pocket(record);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cells.get(name).map(String::as_str)
    }

    pub fn put(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.cells.insert(name.into(), content.into());
    }

    pub fn put_pocket(&mut self, pocket: Pocket) {
        self.cells.insert(pocket.name, pocket.content);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Records sorted by name, for stable serialization.
    pub fn to_records(&self) -> Vec<Pocket> {
        let mut records: Vec<Pocket> = self
            .cells
            .iter()
            .map(|(name, content)| Pocket::new(name.clone(), content.clone()))
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }
}
