//! Resumable interpreter for declarative browser-automation scenarios.
//!
//! Scenarios are built from three record kinds: **steps** (one page action),
//! **ways** (ordered, repeated sequences) and **detours** (branches chosen by
//! the value of a named pocket). A walk descends through them depth first,
//! recovers failed steps through their catch lists under a retry budget, and
//! records its position so an interrupted walk resumes where it stopped.
//!
//! - **[`core`]**: Pure logic (identifiers, records, spots, detour resolution,
//!   invariants). No I/O.
//! - **[`io`]**: Definition files, the resume cursor, config and the
//!   [`io::page::PageDriver`] seam to the browser backend.
//!
//! Orchestration modules ([`actions`], [`step`], [`walk`], [`run`],
//! [`looping`], [`validate`]) combine the two to implement CLI commands.

pub mod actions;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod run;
pub mod step;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
pub mod walk;
