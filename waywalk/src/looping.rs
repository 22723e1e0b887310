//! Polling loop for `waywalk loop`.

use std::path::Path;
use std::thread;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::actions::ActionTable;
use crate::core::pockets::Pockets;
use crate::io::config::load_config;
use crate::io::cursor::set_running;
use crate::io::init::WalkPaths;
use crate::io::page::PageDriver;
use crate::run::{RunOutcome, run_once};

/// Options for `run_loop`.
#[derive(Debug, Clone, Default)]
pub struct LoopOptions {
    /// Stop after this many ticks. `None` polls forever.
    pub max_ticks: Option<u32>,
}

/// Summary of a loop invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopOutcome {
    pub ticks: u32,
    pub completed: u32,
    pub failed: u32,
}

/// Poll the cursor and run a walk whenever it is marked running.
///
/// When `arm_on_start` is configured the cursor is marked running before the
/// first tick, so a restarted process resumes at the cursor's spot. Idle
/// ticks sleep for `poll_interval_ms`. A failed walk does not stop the loop;
/// I/O and definition errors do.
///
/// One pocket store lives for the whole loop, so a value written by one walk
/// is still there on later ticks.
pub fn run_loop<P: PageDriver, F: FnMut(&RunOutcome)>(
    root: &Path,
    page: &mut P,
    actions: &ActionTable,
    options: &LoopOptions,
    mut on_tick: F,
) -> Result<LoopOutcome> {
    let paths = WalkPaths::new(root);
    let cfg = load_config(&paths.config_path)?;
    if cfg.arm_on_start {
        set_running(&paths.cursor_path, true).context("arm cursor on start")?;
        info!("cursor armed on start");
    }

    let mut pockets = Pockets::new();
    let mut outcome = LoopOutcome::default();
    while options.max_ticks.is_none_or(|max| outcome.ticks < max) {
        let tick = run_once(root, page, &mut pockets, actions)?;
        outcome.ticks += 1;
        match &tick {
            RunOutcome::Idle => {
                let interval = load_config(&paths.config_path)?.poll_interval();
                debug!(millis = interval.as_millis() as u64, "cursor idle, sleeping");
                thread::sleep(interval);
            }
            RunOutcome::Completed { .. } => outcome.completed += 1,
            RunOutcome::Failed { .. } => outcome.failed += 1,
        }
        on_tick(&tick);
    }
    Ok(outcome)
}
