//! Step runner: execute one step and promote failure to a catch way.

use tracing::{info, warn};

use crate::actions::{ActionTable, Session};
use crate::core::defs::DefinitionStore;
use crate::core::error::WalkError;
use crate::core::ids::RefId;
use crate::core::model::Way;

/// Run the step `step_id` at position `ordinal` of its way.
///
/// Returns `Ok(None)` when the action succeeds and `Ok(Some(way))` with the
/// step's contingency way when it fails; the failure itself is logged and
/// swallowed. Unknown steps and unregistered action kinds are fatal.
pub fn run_step<D: DefinitionStore + ?Sized>(
    defs: &D,
    actions: &ActionTable,
    session: &mut Session<'_>,
    step_id: &RefId,
    ordinal: usize,
) -> Result<Option<Way>, WalkError> {
    let step = defs
        .step(step_id)
        .ok_or_else(|| WalkError::UnknownStep(step_id.clone()))?;
    info!(ordinal, step = %step.id, description = %step.description, "running step");
    let action = actions
        .get(step.action)
        .ok_or_else(|| WalkError::MissingAction {
            step: step.id.clone(),
            kind: step.action,
        })?;

    match action(session, step) {
        Ok(()) => Ok(None),
        Err(err) => {
            warn!(
                step = %step.id,
                error = %format!("{err:#}"),
                "step failed, switching to catch way"
            );
            Ok(Some(Way::catch_for(step)))
        }
    }
}
