//! One top-level walk attempt driven by the resume cursor.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, instrument, warn};

use crate::actions::{ActionTable, Session};
use crate::core::defs::DefinitionStore;
use crate::core::error::WalkError;
use crate::core::ids::RefId;
use crate::core::pockets::Pockets;
use crate::core::spot::Spot;
use crate::io::config::load_config;
use crate::io::cursor::{InSpot, load_cursor, update_cursor};
use crate::io::definitions::{load_definitions, load_pockets, write_pockets};
use crate::io::init::WalkPaths;
use crate::io::page::PageDriver;
use crate::walk::{WalkStats, Walker};

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The cursor is not marked running; nothing was walked.
    Idle,
    /// The root way walked to the end.
    Completed { way_id: RefId, stats: WalkStats },
    /// A fatal error stopped the walk. The cursor keeps the failing position.
    Failed {
        way_id: RefId,
        error: WalkError,
        stats: WalkStats,
    },
}

/// Run the cursor's root way if the cursor is marked running.
///
/// `pockets` is the caller's scratch store. It outlives the attempt, so values
/// written by one walk are visible to the next; `pocket.json` is upserted
/// over it before each walk. Definitions are reloaded from disk on every call.
///
/// Once an attempt starts the running flag is cleared on every path,
/// including load and persistence errors. A completed walk also rewinds the
/// cursor spot to the start.
///
/// Errors are returned only for I/O and definition problems. Fatal walk errors
/// are reported as [`RunOutcome::Failed`].
#[instrument(skip_all, fields(root = %root.display()))]
pub fn run_once<P: PageDriver>(
    root: &Path,
    page: &mut P,
    pockets: &mut Pockets,
    actions: &ActionTable,
) -> Result<RunOutcome> {
    let paths = WalkPaths::new(root);
    let cursor = load_cursor(&paths.cursor_path)?;
    if !cursor.is_run {
        return Ok(RunOutcome::Idle);
    }
    info!(way = %cursor.way_id, spot = %cursor.spot, limit = cursor.limit, "starting walk");

    let attempt = attempt_walk(&paths, &cursor, page, pockets, actions);
    let completed = matches!(&attempt, Ok((Ok(()), _)));
    let cleared = update_cursor(&paths.cursor_path, |stored| {
        stored.is_run = false;
        if completed {
            stored.spot = Spot::default();
        }
    })
    .context("clear running flag");
    let (result, stats) = attempt?;
    cleared?;

    let way_id = cursor.way_id;
    match result {
        Ok(()) => {
            info!(
                way = %way_id,
                steps = stats.steps_run,
                catch_descents = stats.catch_descents,
                "walk completed"
            );
            Ok(RunOutcome::Completed { way_id, stats })
        }
        Err(err) => {
            error!(way = %way_id, error = %err, steps = stats.steps_run, "walk failed");
            Ok(RunOutcome::Failed {
                way_id,
                error: err,
                stats,
            })
        }
    }
}

/// Load config, definitions and seed pockets, walk, then persist pockets when
/// configured.
fn attempt_walk<P: PageDriver>(
    paths: &WalkPaths,
    cursor: &InSpot,
    page: &mut P,
    pockets: &mut Pockets,
    actions: &ActionTable,
) -> Result<(Result<(), WalkError>, WalkStats)> {
    let cfg = load_config(&paths.config_path)?;
    let defs = load_definitions(paths).context("load definitions")?;
    pockets.seed(load_pockets(&paths.pockets_path)?);

    let (result, stats) = match defs.way(&cursor.way_id) {
        None => (
            Err(WalkError::UnknownWay(cursor.way_id.clone())),
            WalkStats::default(),
        ),
        Some(root_way) => {
            let session = Session::new(page, pockets, cfg.open_page_settle());
            let mut walker = Walker::new(&defs, actions, session);
            if cfg.checkpoint_spot {
                let cursor_path = paths.cursor_path.clone();
                walker = walker.with_checkpoint(move |spot: &Spot| {
                    let saved =
                        update_cursor(&cursor_path, |cursor| cursor.spot = spot.clone());
                    if let Err(err) = saved {
                        warn!(
                            error = %format!("{err:#}"),
                            spot = %spot,
                            "failed to checkpoint spot"
                        );
                    }
                });
            }
            let result = walker.walk(root_way, &cursor.spot, cursor.limit);
            (result, walker.stats())
        }
    };

    if cfg.persist_pockets {
        write_pockets(&paths.pockets_path, pockets).context("persist pockets")?;
    }
    Ok((result, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ActionKind, Pocket};
    use crate::test_support::{ScriptedPage, TestWorkspace, action_step, way};

    fn run(ws: &TestWorkspace, page: &mut ScriptedPage) -> RunOutcome {
        run_with(ws, page, &mut Pockets::new()).expect("run")
    }

    fn run_with(
        ws: &TestWorkspace,
        page: &mut ScriptedPage,
        pockets: &mut Pockets,
    ) -> Result<RunOutcome> {
        run_once(ws.root(), page, pockets, &ActionTable::standard())
    }

    #[test]
    fn idle_cursor_does_nothing() {
        let ws = TestWorkspace::new().expect("workspace");
        let mut page = ScriptedPage::default();
        let outcome = run(&ws, &mut page);
        assert_eq!(outcome, RunOutcome::Idle);
        assert!(page.calls.is_empty());
    }

    #[test]
    fn completed_walk_clears_flag_and_rewinds_spot() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write_definitions(
            &[
                action_step("a", ActionKind::Chek, "#a", "", ""),
                action_step("b", ActionKind::Chek, "#b", "", ""),
            ],
            &[way("main", 1, &["Step>a", "Step>b"])],
            &[],
        )
        .expect("defs");
        ws.arm("main", 2, Spot::at(1)).expect("arm");

        let mut page = ScriptedPage::default();
        let outcome = run(&ws, &mut page);
        assert!(matches!(outcome, RunOutcome::Completed { stats, .. } if stats.steps_run == 1));
        assert_eq!(page.waits(), vec!["#b"]);

        let cursor = ws.cursor().expect("cursor");
        assert!(!cursor.is_run);
        assert_eq!(cursor.spot, Spot::default());
        assert_eq!(cursor.limit, 2);
    }

    #[test]
    fn failed_walk_clears_flag_and_keeps_failing_position() {
        let ws = TestWorkspace::new().expect("workspace");
        let mut looping = action_step("a", ActionKind::Chek, "#never", "", "");
        looping.catch = vec![RefId::step("a")];
        ws.write_definitions(
            &[action_step("ok", ActionKind::None, "", "", ""), looping],
            &[way("main", 1, &["Step>ok", "Step>a"])],
            &[],
        )
        .expect("defs");
        ws.arm("main", 1, Spot::default()).expect("arm");

        let mut page = ScriptedPage::default().missing("#never");
        let outcome = run(&ws, &mut page);
        match outcome {
            RunOutcome::Failed { error, stats, .. } => {
                assert_eq!(error, WalkError::RetryBudgetExhausted { step: RefId::step("a") });
                assert_eq!(stats.catch_descents, 1);
            }
            other => panic!("expected failure, got {other:?}"),
        }

        let cursor = ws.cursor().expect("cursor");
        assert!(!cursor.is_run);
        assert_eq!(cursor.spot, Spot::from_path(&[1, 0]));
    }

    #[test]
    fn missing_root_way_is_a_failed_run() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.arm("absent", 1, Spot::default()).expect("arm");
        let mut page = ScriptedPage::default();
        let outcome = run(&ws, &mut page);
        assert!(matches!(
            outcome,
            RunOutcome::Failed { error: WalkError::UnknownWay(_), .. }
        ));
        assert!(!ws.cursor().expect("cursor").is_run);
    }

    #[test]
    fn pockets_are_seeded_and_optionally_persisted() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write_definitions(
            &[action_step("copy", ActionKind::DuplicatePocket, "greeting", "copy", "")],
            &[way("main", 1, &["Step>copy"])],
            &[],
        )
        .expect("defs");
        ws.write_pockets(&[Pocket::new("greeting", "hola")]).expect("pockets");
        ws.update_config(|cfg| cfg.persist_pockets = true).expect("config");
        ws.arm("main", 0, Spot::default()).expect("arm");

        let mut page = ScriptedPage::default();
        run(&ws, &mut page);
        let stored = load_pockets(&ws.paths().pockets_path).expect("pockets");
        assert_eq!(
            stored,
            vec![Pocket::new("copy", "hola"), Pocket::new("greeting", "hola")]
        );
    }

    #[test]
    fn checkpointing_can_be_disabled() {
        let ws = TestWorkspace::new().expect("workspace");
        let mut failing = action_step("a", ActionKind::Chek, "#gone", "", "");
        failing.catch = vec![RefId::step("a")];
        ws.write_definitions(
            &[action_step("ok", ActionKind::None, "", "", ""), failing],
            &[way("main", 1, &["Way>sub"]), way("sub", 1, &["Step>ok", "Step>a"])],
            &[],
        )
        .expect("defs");
        ws.update_config(|cfg| cfg.checkpoint_spot = false).expect("config");
        let armed = InSpot {
            is_run: true,
            limit: 0,
            way_id: RefId::way("main"),
            spot: Spot::at(0),
        };
        ws.write_cursor(&armed).expect("cursor");

        let mut page = ScriptedPage::default().missing("#gone");
        let outcome = run(&ws, &mut page);
        assert!(matches!(outcome, RunOutcome::Failed { .. }));
        // With checkpoints on this would read 0.1.
        assert_eq!(ws.cursor().expect("cursor").spot, Spot::at(0));
    }

    #[test]
    fn pockets_outlive_the_attempt_and_seeds_are_upserted() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write_definitions(
            &[action_step("keep", ActionKind::DuplicatePocket, "", "token", "abc")],
            &[way("main", 1, &["Step>keep"])],
            &[],
        )
        .expect("defs");
        ws.write_pockets(&[Pocket::new("greeting", "hola")]).expect("pockets");
        ws.arm("main", 0, Spot::default()).expect("arm");

        let mut pockets = Pockets::seeded(vec![Pocket::new("greeting", "stale")]);
        let mut page = ScriptedPage::default();
        run_with(&ws, &mut page, &mut pockets).expect("run");
        assert_eq!(pockets.get("token"), Some("abc"));
        assert_eq!(pockets.get("greeting"), Some("hola"));
    }

    #[test]
    fn persistence_failure_still_clears_running_flag() {
        let ws = TestWorkspace::new().expect("workspace");
        ws.write_definitions(
            &[action_step("ok", ActionKind::None, "", "", "")],
            &[way("main", 1, &["Step>ok"])],
            &[],
        )
        .expect("defs");
        ws.update_config(|cfg| cfg.persist_pockets = true).expect("config");
        ws.arm("main", 0, Spot::default()).expect("arm");
        let blocker = ws.paths().pockets_path.with_extension("json.tmp");
        std::fs::create_dir(&blocker).expect("block temp file");

        let mut page = ScriptedPage::default();
        let err = run_with(&ws, &mut page, &mut Pockets::new()).expect_err("persist fails");
        assert!(format!("{err:#}").contains("persist pockets"));
        assert!(!ws.cursor().expect("cursor").is_run);
    }

    #[test]
    fn load_failure_still_clears_running_flag() {
        let ws = TestWorkspace::new().expect("workspace");
        std::fs::write(&ws.paths().ways_path, "not json").expect("corrupt ways");
        ws.arm("main", 0, Spot::default()).expect("arm");

        let mut page = ScriptedPage::default();
        assert!(run_with(&ws, &mut page, &mut Pockets::new()).is_err());
        assert!(!ws.cursor().expect("cursor").is_run);
    }
}
