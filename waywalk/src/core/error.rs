//! Fatal walk errors.
//!
//! Action failures are not represented here: they are recovered locally by
//! turning them into a catch way. Everything in [`WalkError`] aborts the whole
//! walk and propagates to the top-level caller.

use thiserror::Error;

use crate::core::ids::{InvalidId, RefId};
use crate::core::model::ActionKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    #[error("step {0} not found")]
    UnknownStep(RefId),
    #[error("way {0} not found")]
    UnknownWay(RefId),
    #[error("detour {0} not found")]
    UnknownDetour(RefId),
    #[error("pocket '{pocket}' required by {detour} not found")]
    MissingPocket { detour: RefId, pocket: String },
    #[error("detour {detour} has no entry for value '{value}'")]
    NoDetourEntry { detour: RefId, value: String },
    #[error("no action registered for {kind:?} (step {step})")]
    MissingAction { step: RefId, kind: ActionKind },
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidId),
    #[error("retry budget exhausted while recovering {step}")]
    RetryBudgetExhausted { step: RefId },
}
