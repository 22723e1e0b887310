//! The tree walker: recursive, resumable, retry-bounded way execution.
//!
//! A walk descends three kinds of edges:
//! - nested ways and resolved detours, which keep the retry budget as is;
//! - catch ways built from failed steps, which cost one unit of budget.
//!
//! The budget is passed by value into every activation. Catch descents inside
//! one activation draw from that activation's copy; a child never returns
//! budget to its parent.

use tracing::debug;

use crate::actions::{ActionTable, Session};
use crate::core::defs::DefinitionStore;
use crate::core::error::WalkError;
use crate::core::ids::{RefId, RefKind};
use crate::core::model::Way;
use crate::core::spot::Spot;
use crate::core::tack::resolve_detour;
use crate::step::run_step;

/// Callback receiving the position of every step about to run.
pub type Checkpoint<'a> = Box<dyn FnMut(&Spot) + 'a>;

/// Counters collected over a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub steps_run: u32,
    pub catch_descents: u32,
}

/// Executes ways against a session. One walker serves one top-level walk.
pub struct Walker<'a, D: DefinitionStore + ?Sized> {
    defs: &'a D,
    actions: &'a ActionTable,
    session: Session<'a>,
    /// Current index at every active depth, outermost first.
    trail: Vec<usize>,
    checkpoint: Option<Checkpoint<'a>>,
    stats: WalkStats,
}

impl<'a, D: DefinitionStore + ?Sized> Walker<'a, D> {
    pub fn new(defs: &'a D, actions: &'a ActionTable, session: Session<'a>) -> Self {
        Self {
            defs,
            actions,
            session,
            trail: Vec::new(),
            checkpoint: None,
            stats: WalkStats::default(),
        }
    }

    /// Report the position of each step before it runs.
    pub fn with_checkpoint(mut self, checkpoint: impl FnMut(&Spot) + 'a) -> Self {
        self.checkpoint = Some(Box::new(checkpoint));
        self
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Walk `way` starting at `spot` with `limit` catch descents available.
    ///
    /// `way.repeat` passes are made over the step list. Only the first pass
    /// honours the start index of `spot`, and only the reference at that index
    /// receives the inner spot; every other descent starts at the beginning.
    pub fn walk(&mut self, way: &Way, spot: &Spot, limit: u32) -> Result<(), WalkError> {
        self.trail.push(0);
        let result = self.walk_passes(way, spot, limit);
        self.trail.pop();
        result
    }

    fn walk_passes(&mut self, way: &Way, spot: &Spot, mut limit: u32) -> Result<(), WalkError> {
        let (start, resume) = spot.split();
        debug!(way = %way.id, description = %way.description, spot = %spot, limit, "walking way");

        for pass in 0..way.repeat {
            let first = if pass == 0 { start } else { 0 };
            for (index, target) in way.steps.iter().enumerate().skip(first) {
                self.set_position(index);
                let child = if pass == 0 && index == start {
                    resume.clone()
                } else {
                    Spot::default()
                };
                match target.kind() {
                    RefKind::Step => {
                        self.report_position();
                        self.stats.steps_run += 1;
                        let catch =
                            run_step(self.defs, self.actions, &mut self.session, target, index)?;
                        if let Some(catch_way) = catch.filter(|catch| !catch.steps.is_empty()) {
                            limit = self.spend_budget(target, limit)?;
                            self.walk(&catch_way, &child, limit)?;
                        }
                    }
                    RefKind::Way => {
                        let nested = self.lookup_way(target)?;
                        self.walk(nested, &child, limit)?;
                    }
                    RefKind::Detour => {
                        let branch = resolve_detour(self.defs, self.session.pockets, target)?;
                        self.walk(&branch, &child, limit)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn spend_budget(&mut self, step: &RefId, limit: u32) -> Result<u32, WalkError> {
        if limit == 0 {
            return Err(WalkError::RetryBudgetExhausted { step: step.clone() });
        }
        self.stats.catch_descents += 1;
        debug!(step = %step, remaining = limit - 1, "descending into catch way");
        Ok(limit - 1)
    }

    fn lookup_way(&self, id: &RefId) -> Result<&'a Way, WalkError> {
        let defs: &'a D = self.defs;
        defs.way(id).ok_or_else(|| WalkError::UnknownWay(id.clone()))
    }

    fn set_position(&mut self, index: usize) {
        if let Some(last) = self.trail.last_mut() {
            *last = index;
        }
    }

    fn report_position(&mut self) {
        if let Some(checkpoint) = self.checkpoint.as_mut() {
            checkpoint(&Spot::from_path(&self.trail));
        }
    }
}
