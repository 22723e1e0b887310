//! Workflow definition records.
//!
//! Field names follow the on-disk JSON records (`entrys`, `catch`, camelCase
//! action kinds), so definition files written by the recorder load unchanged.

use serde::{Deserialize, Serialize};

use crate::core::ids::{RefId, RefKind};

/// Comparison value that matches any pocket content without its own entry.
pub const DEFAULT_ENTRY: &str = "default";

/// The UI or scratch action a step performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    OpenPage,
    ClosePage,
    Stop,
    Click,
    Type,
    TypePass,
    Paste,
    PasteText,
    CopyText,
    CopyLinck,
    PoketExtract,
    PoketRefine,
    DuplicatePocket,
    Chek,
    #[default]
    None,
}

impl ActionKind {
    pub const ALL: [ActionKind; 15] = [
        ActionKind::OpenPage,
        ActionKind::ClosePage,
        ActionKind::Stop,
        ActionKind::Click,
        ActionKind::Type,
        ActionKind::TypePass,
        ActionKind::Paste,
        ActionKind::PasteText,
        ActionKind::CopyText,
        ActionKind::CopyLinck,
        ActionKind::PoketExtract,
        ActionKind::PoketRefine,
        ActionKind::DuplicatePocket,
        ActionKind::Chek,
        ActionKind::None,
    ];
}

/// Atomic action definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: RefId,
    pub description: String,
    #[serde(default)]
    pub action: ActionKind,
    #[serde(default)]
    pub selector: String,
    #[serde(default)]
    pub pocket: String,
    #[serde(default)]
    pub payload: String,
    /// References run as a contingency way when the action fails.
    #[serde(default)]
    pub catch: Vec<RefId>,
}

/// Ordered, repeatable sequence of step/way/detour references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Way {
    pub id: RefId,
    pub description: String,
    pub repeat: u32,
    pub steps: Vec<RefId>,
}

impl Way {
    /// Transient contingency way built from a failed step's catch list.
    pub fn catch_for(step: &Step) -> Self {
        Self {
            id: RefId::way(format!("Catch-{}", step.id.local())),
            description: format!("Contingency for step {}", step.id),
            repeat: 1,
            steps: step.catch.clone(),
        }
    }
}

/// One branch of a detour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub value: String,
    #[serde(default)]
    pub steps: Vec<RefId>,
}

impl Entry {
    pub fn is_default(&self) -> bool {
        self.value == DEFAULT_ENTRY
    }
}

/// Data-driven branch point keyed on a pocket's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detour {
    pub id: RefId,
    pub description: String,
    pub pocket: String,
    #[serde(rename = "entrys")]
    pub entries: Vec<Entry>,
}

impl Detour {
    /// Id of the way a resolved detour becomes.
    pub fn way_id(&self) -> RefId {
        self.id.with_kind(RefKind::Way)
    }
}

/// Named scratch value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pocket {
    pub name: String,
    pub content: String,
}

impl Pocket {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_record_defaults_missing_fields() {
        let step: Step =
            serde_json::from_str(r#"{"id":"Step>wait","description":"Wait"}"#).expect("parse");
        assert_eq!(step.action, ActionKind::None);
        assert!(step.selector.is_empty());
        assert!(step.pocket.is_empty());
        assert!(step.payload.is_empty());
        assert!(step.catch.is_empty());
    }

    #[test]
    fn action_kinds_use_recorded_spelling() {
        let kinds: Vec<ActionKind> =
            serde_json::from_str(r#"["openPage","copyLinck","poketRefine","chek","typePass"]"#)
                .expect("parse");
        assert_eq!(
            kinds,
            vec![
                ActionKind::OpenPage,
                ActionKind::CopyLinck,
                ActionKind::PoketRefine,
                ActionKind::Chek,
                ActionKind::TypePass,
            ]
        );
        assert!(serde_json::from_str::<ActionKind>("\"hover\"").is_err());
    }

    #[test]
    fn detour_reads_entrys_field() {
        let detour: Detour = serde_json::from_str(
            r#"{"id":"Detour>lang","description":"Pick","pocket":"lang",
                "entrys":[{"value":"es","steps":["Step>es"]},{"value":"default"}]}"#,
        )
        .expect("parse");
        assert_eq!(detour.entries.len(), 2);
        assert!(detour.entries[1].is_default());
        assert!(detour.entries[1].steps.is_empty());
        assert_eq!(detour.way_id(), RefId::way("lang"));
    }

    #[test]
    fn catch_way_is_named_after_the_step() {
        let step = Step {
            id: RefId::step("login"),
            description: "Log in".to_string(),
            action: ActionKind::Click,
            selector: "#login".to_string(),
            pocket: String::new(),
            payload: String::new(),
            catch: vec![RefId::step("dismiss"), RefId::way("relogin")],
        };
        let way = Way::catch_for(&step);
        assert_eq!(way.id.to_string(), "Way>Catch-login");
        assert_eq!(way.repeat, 1);
        assert_eq!(way.steps, step.catch);
    }
}
