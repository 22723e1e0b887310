//! Resumable browser-automation scenario walker.
//!
//! Reads step, way and detour definitions from `.waywalk/` in the current
//! directory and walks the way named by the resume cursor
//! (`.waywalk/inSpot.json`).

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::error;

use waywalk::actions::ActionTable;
use waywalk::core::ids::{RefId, RefKind};
use waywalk::core::pockets::Pockets;
use waywalk::core::spot::Spot;
use waywalk::exit_codes;
use waywalk::io::cursor::{load_cursor, update_cursor};
use waywalk::io::init::{InitOptions, WalkPaths, init_workspace};
use waywalk::io::page::TracePage;
use waywalk::logging;
use waywalk::looping::{LoopOptions, run_loop};
use waywalk::run::{RunOutcome, run_once};
use waywalk::validate::validate_workspace;

#[derive(Parser, Debug)]
#[command(
    name = "waywalk",
    version,
    about = "Resumable interpreter for declarative browser-automation scenarios"
)]
struct Cli {
    /// Log pauses instead of sleeping through them.
    #[arg(long, global = true)]
    no_pause: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create `.waywalk/` with empty definitions, an idle cursor and config.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Check definitions and cursor (identifiers, references, cycles).
    Validate,
    /// Mark the cursor running for a root way.
    Arm {
        /// Root way, as `Way>name` or bare `name`.
        way_id: String,
        /// Retry budget for catch descents.
        #[arg(short, long)]
        limit: Option<u32>,
        /// Resume position in dotted form, e.g. `2.1`.
        #[arg(short, long)]
        spot: Option<Spot>,
    },
    /// Print the resume cursor.
    Status,
    /// Run one top-level walk if the cursor is marked running.
    Run,
    /// Poll the cursor and walk whenever it is marked running.
    Loop {
        /// Stop after this many ticks.
        #[arg(long)]
        max_ticks: Option<u32>,
    },
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    let page = TracePage {
        skip_pauses: cli.no_pause,
    };
    match dispatch(cli.command, Path::new("."), page) {
        Ok(code) => exit_code(code),
        Err(err) => {
            error!(error = %format!("{err:#}"), "command failed");
            eprintln!("{err:#}");
            exit_code(exit_codes::INVALID)
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn dispatch(command: Command, root: &Path, page: TracePage) -> Result<i32> {
    match command {
        Command::Init { force } => cmd_init(root, force),
        Command::Validate => cmd_validate(root),
        Command::Arm {
            way_id,
            limit,
            spot,
        } => cmd_arm(root, &way_id, limit, spot),
        Command::Status => cmd_status(root),
        Command::Run => cmd_run(root, page),
        Command::Loop { max_ticks } => cmd_loop(root, page, max_ticks),
    }
}

fn cmd_init(root: &Path, force: bool) -> Result<i32> {
    let paths = init_workspace(root, &InitOptions { force })?;
    println!("initialized {}", paths.data_dir.display());
    Ok(exit_codes::OK)
}

fn cmd_validate(root: &Path) -> Result<i32> {
    let report = validate_workspace(root)?;
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    if !report.is_valid() {
        bail!("invariant violations:\n- {}", report.errors.join("\n- "));
    }
    println!(
        "ok: {} steps, {} ways, {} detours, {} pockets",
        report.steps, report.ways, report.detours, report.pockets
    );
    Ok(exit_codes::OK)
}

fn cmd_arm(root: &Path, way_id: &str, limit: Option<u32>, spot: Option<Spot>) -> Result<i32> {
    let way_id = parse_way_id(way_id)?;
    let paths = WalkPaths::new(root);
    let cursor = update_cursor(&paths.cursor_path, |cursor| {
        cursor.is_run = true;
        cursor.way_id = way_id;
        cursor.spot = spot.unwrap_or_default();
        if let Some(limit) = limit {
            cursor.limit = limit;
        }
    })
    .context("arm cursor")?;
    println!(
        "armed {} at {} with limit {}",
        cursor.way_id, cursor.spot, cursor.limit
    );
    Ok(exit_codes::OK)
}

fn cmd_status(root: &Path) -> Result<i32> {
    let paths = WalkPaths::new(root);
    let cursor = load_cursor(&paths.cursor_path)?;
    println!("{}", serde_json::to_string_pretty(&cursor)?);
    Ok(exit_codes::OK)
}

fn cmd_run(root: &Path, mut page: TracePage) -> Result<i32> {
    let mut pockets = Pockets::new();
    let outcome = run_once(root, &mut page, &mut pockets, &ActionTable::standard())?;
    Ok(report_outcome(&outcome))
}

fn cmd_loop(root: &Path, mut page: TracePage, max_ticks: Option<u32>) -> Result<i32> {
    let summary = run_loop(
        root,
        &mut page,
        &ActionTable::standard(),
        &LoopOptions { max_ticks },
        |outcome| {
            if !matches!(outcome, RunOutcome::Idle) {
                report_outcome(outcome);
            }
        },
    )?;
    println!(
        "{} ticks: {} completed, {} failed",
        summary.ticks, summary.completed, summary.failed
    );
    Ok(exit_codes::OK)
}

fn report_outcome(outcome: &RunOutcome) -> i32 {
    match outcome {
        RunOutcome::Idle => {
            println!("idle: cursor is not marked running");
            exit_codes::IDLE
        }
        RunOutcome::Completed { way_id, stats } => {
            println!(
                "completed {way_id}: {} steps, {} catch descents",
                stats.steps_run, stats.catch_descents
            );
            exit_codes::OK
        }
        RunOutcome::Failed { way_id, error, .. } => {
            println!("failed {way_id}: {error}");
            exit_codes::FAILED
        }
    }
}

/// Accept `Way>name` or a bare `name`; any other prefix is rejected.
fn parse_way_id(raw: &str) -> Result<RefId> {
    if !raw.contains('>') {
        return Ok(RefId::way(raw));
    }
    let id: RefId = raw.parse()?;
    if id.kind() != RefKind::Way {
        bail!("{id} is not a way identifier");
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["waywalk", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }

    #[test]
    fn parse_arm_with_limit_and_spot() {
        let cli = Cli::parse_from(["waywalk", "arm", "Way>main", "--limit", "5", "--spot", "2.1"]);
        match cli.command {
            Command::Arm {
                way_id,
                limit,
                spot,
            } => {
                assert_eq!(way_id, "Way>main");
                assert_eq!(limit, Some(5));
                assert_eq!(spot, Some(Spot::from_path(&[2, 1])));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parse_loop_max_ticks() {
        let cli = Cli::parse_from(["waywalk", "loop", "--max-ticks", "4", "--no-pause"]);
        assert!(cli.no_pause);
        assert!(matches!(
            cli.command,
            Command::Loop {
                max_ticks: Some(4)
            }
        ));
    }

    #[test]
    fn way_ids_accept_bare_names_and_reject_other_kinds() {
        assert_eq!(parse_way_id("main").expect("bare"), RefId::way("main"));
        assert_eq!(parse_way_id("Way>main").expect("prefixed"), RefId::way("main"));
        assert!(parse_way_id("Step>main").is_err());
    }
}
