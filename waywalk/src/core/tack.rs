//! Detour resolution ("tack"): pick the branch matching a pocket's content.

use tracing::debug;

use crate::core::defs::DefinitionStore;
use crate::core::error::WalkError;
use crate::core::ids::RefId;
use crate::core::model::{Detour, Entry, Way};
use crate::core::pockets::Pockets;

/// Resolve `detour_id` into a transient way for the entry matching its pocket.
///
/// An exact value match wins over the `default` entry. No match and no
/// default is fatal, as is a missing detour or pocket.
pub fn resolve_detour<D: DefinitionStore + ?Sized>(
    defs: &D,
    pockets: &Pockets,
    detour_id: &RefId,
) -> Result<Way, WalkError> {
    let detour = defs
        .detour(detour_id)
        .ok_or_else(|| WalkError::UnknownDetour(detour_id.clone()))?;
    let content = pockets
        .get(&detour.pocket)
        .ok_or_else(|| WalkError::MissingPocket {
            detour: detour.id.clone(),
            pocket: detour.pocket.clone(),
        })?;
    let entry = select_entry(detour, content).ok_or_else(|| WalkError::NoDetourEntry {
        detour: detour.id.clone(),
        value: content.to_string(),
    })?;
    debug!(detour = %detour.id, value = content, entry = %entry.value, "detour resolved");
    Ok(Way {
        id: detour.way_id(),
        description: detour.description.clone(),
        repeat: 1,
        steps: entry.steps.clone(),
    })
}

fn select_entry<'a>(detour: &'a Detour, content: &str) -> Option<&'a Entry> {
    detour
        .entries
        .iter()
        .find(|entry| entry.value == content)
        .or_else(|| detour.entries.iter().find(|entry| entry.is_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::defs::Definitions;
    use crate::test_support::{detour, refs};

    fn colour_defs() -> Definitions {
        Definitions::new(
            Vec::new(),
            Vec::new(),
            vec![detour(
                "colour",
                "colour",
                &[("red", &["Step>X"]), ("default", &["Step>Y"])],
            )],
        )
    }

    #[test]
    fn falls_back_to_default_entry() {
        let pockets = Pockets::seeded(vec![crate::core::model::Pocket::new("colour", "blue")]);
        let way =
            resolve_detour(&colour_defs(), &pockets, &RefId::detour("colour")).expect("resolve");
        assert_eq!(way.steps, refs(&["Step>Y"]));
        assert_eq!(way.id, RefId::way("colour"));
        assert_eq!(way.repeat, 1);
    }

    #[test]
    fn exact_match_wins_and_is_stable() {
        let mut pockets = Pockets::new();
        pockets.put("colour", "red");
        let defs = colour_defs();
        let first = resolve_detour(&defs, &pockets, &RefId::detour("colour")).expect("first");
        let second = resolve_detour(&defs, &pockets, &RefId::detour("colour")).expect("second");
        assert_eq!(first, second);
        assert_eq!(first.steps, refs(&["Step>X"]));
    }

    #[test]
    fn no_match_without_default_is_fatal() {
        let defs = Definitions::new(
            Vec::new(),
            Vec::new(),
            vec![detour("colour", "colour", &[("red", &["Step>X"])])],
        );
        let mut pockets = Pockets::new();
        pockets.put("colour", "green");
        let err = resolve_detour(&defs, &pockets, &RefId::detour("colour")).expect_err("fatal");
        assert_eq!(
            err,
            WalkError::NoDetourEntry {
                detour: RefId::detour("colour"),
                value: "green".to_string(),
            }
        );
    }

    #[test]
    fn missing_detour_or_pocket_is_fatal() {
        let defs = colour_defs();
        let err =
            resolve_detour(&defs, &Pockets::new(), &RefId::detour("colour")).expect_err("pocket");
        assert!(matches!(err, WalkError::MissingPocket { .. }));
        let err =
            resolve_detour(&defs, &Pockets::new(), &RefId::detour("shape")).expect_err("detour");
        assert_eq!(err, WalkError::UnknownDetour(RefId::detour("shape")));
    }

    #[test]
    fn entry_without_steps_resolves_to_empty_way() {
        let defs = Definitions::new(
            Vec::new(),
            Vec::new(),
            vec![detour("skip", "flag", &[("default", &[])])],
        );
        let mut pockets = Pockets::new();
        pockets.put("flag", "anything");
        let way = resolve_detour(&defs, &pockets, &RefId::detour("skip")).expect("resolve");
        assert!(way.steps.is_empty());
    }
}
