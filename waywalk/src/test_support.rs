//! Test-only helpers: definition builders, a scripted page driver and a
//! temporary workspace.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::ids::RefId;
use crate::core::model::{ActionKind, Detour, Entry, Pocket, Step, Way};
use crate::core::pockets::Pockets;
use crate::core::spot::Spot;
use crate::io::config::{WalkerConfig, load_config, write_config};
use crate::io::cursor::{InSpot, load_cursor, write_cursor};
use crate::io::definitions::{write_definitions, write_pockets};
use crate::io::init::{InitOptions, WalkPaths, init_workspace};
use crate::io::page::PageDriver;

/// Parse prefixed ids, panicking on malformed fixtures.
pub fn refs(ids: &[&str]) -> Vec<RefId> {
    ids.iter()
        .map(|id| id.parse().expect("fixture id"))
        .collect()
}

/// Step with explicit action fields and no catch list.
pub fn action_step(
    local: &str,
    action: ActionKind,
    selector: &str,
    pocket: &str,
    payload: &str,
) -> Step {
    Step {
        id: RefId::step(local),
        description: format!("{local} description"),
        action,
        selector: selector.to_string(),
        pocket: pocket.to_string(),
        payload: payload.to_string(),
        catch: Vec::new(),
    }
}

/// Step whose action always succeeds.
pub fn noop_step(local: &str) -> Step {
    action_step(local, ActionKind::None, "", "", "")
}

/// No-op step carrying a catch list.
pub fn step_with_catch(local: &str, catch: &[&str]) -> Step {
    Step {
        catch: refs(catch),
        ..noop_step(local)
    }
}

pub fn way(local: &str, repeat: u32, steps: &[&str]) -> Way {
    Way {
        id: RefId::way(local),
        description: format!("{local} description"),
        repeat,
        steps: refs(steps),
    }
}

pub fn detour(local: &str, pocket: &str, entries: &[(&str, &[&str])]) -> Detour {
    Detour {
        id: RefId::detour(local),
        description: format!("{local} description"),
        pocket: pocket.to_string(),
        entries: entries
            .iter()
            .map(|(value, steps)| Entry {
                value: value.to_string(),
                steps: refs(steps),
            })
            .collect(),
    }
}

/// Page driver that records every primitive as a line in `calls`.
///
/// Waits fail for selectors marked `missing`, and for `flaky` selectors until
/// their failure count runs out. Pauses are recorded, never slept.
#[derive(Debug, Default)]
pub struct ScriptedPage {
    pub calls: Vec<String>,
    missing: HashSet<String>,
    flaky: HashMap<String, u32>,
    texts: HashMap<String, String>,
    links: HashMap<String, String>,
}

impl ScriptedPage {
    pub fn missing(mut self, selector: &str) -> Self {
        self.missing.insert(selector.to_string());
        self
    }

    pub fn flaky(mut self, selector: &str, failures: u32) -> Self {
        self.flaky.insert(selector.to_string(), failures);
        self
    }

    pub fn with_text(mut self, selector: &str, text: &str) -> Self {
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn with_link(mut self, selector: &str, link: &str) -> Self {
        self.links.insert(selector.to_string(), link.to_string());
        self
    }

    /// Selectors waited on, in order.
    pub fn waits(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| call.strip_prefix("wait "))
            .map(str::to_string)
            .collect()
    }
}

impl PageDriver for ScriptedPage {
    fn goto(&mut self, url: &str) -> Result<()> {
        self.calls.push(format!("goto {url}"));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.calls.push("close".to_string());
        Ok(())
    }

    fn wait_for_selector(&mut self, selector: &str) -> Result<()> {
        self.calls.push(format!("wait {selector}"));
        if self.missing.contains(selector) {
            return Err(anyhow!("selector {selector} not found"));
        }
        if let Some(remaining) = self.flaky.get_mut(selector) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(anyhow!("selector {selector} not ready"));
            }
        }
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        self.calls.push(format!("click {selector}"));
        Ok(())
    }

    fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        self.calls.push(format!("type {selector} {text}"));
        Ok(())
    }

    fn set_value(&mut self, selector: &str, text: &str) -> Result<()> {
        self.calls.push(format!("value {selector} {text}"));
        Ok(())
    }

    fn set_inner_text(&mut self, selector: &str, text: &str) -> Result<()> {
        self.calls.push(format!("text {selector} {text}"));
        Ok(())
    }

    fn inner_text(&mut self, selector: &str) -> Result<String> {
        self.calls.push(format!("read {selector}"));
        Ok(self.texts.get(selector).cloned().unwrap_or_default())
    }

    fn link_target(&mut self, selector: &str) -> Result<String> {
        self.calls.push(format!("href {selector}"));
        Ok(self.links.get(selector).cloned().unwrap_or_default())
    }

    fn pause(&mut self, duration: Duration) {
        self.calls.push(format!("pause {}", duration.as_millis()));
    }
}

/// Scaffolded `.waywalk/` workspace in a temp directory.
pub struct TestWorkspace {
    _temp: TempDir,
    paths: WalkPaths,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let paths = init_workspace(temp.path(), &InitOptions { force: false })?;
        Ok(Self { _temp: temp, paths })
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    pub fn paths(&self) -> &WalkPaths {
        &self.paths
    }

    pub fn write_definitions(
        &self,
        steps: &[Step],
        ways: &[Way],
        detours: &[Detour],
    ) -> Result<()> {
        write_definitions(&self.paths, steps, ways, detours)
    }

    pub fn write_pockets(&self, pockets: &[Pocket]) -> Result<()> {
        write_pockets(&self.paths.pockets_path, &Pockets::seeded(pockets.to_vec()))
    }

    pub fn update_config(&self, change: impl FnOnce(&mut WalkerConfig)) -> Result<()> {
        let mut cfg = load_config(&self.paths.config_path)?;
        change(&mut cfg);
        write_config(&self.paths.config_path, &cfg)
    }

    /// Mark the cursor running for `Way><way>`.
    pub fn arm(&self, way: &str, limit: u32, spot: Spot) -> Result<()> {
        self.write_cursor(&InSpot {
            is_run: true,
            limit,
            way_id: RefId::way(way),
            spot,
        })
    }

    pub fn write_cursor(&self, cursor: &InSpot) -> Result<()> {
        write_cursor(&self.paths.cursor_path, cursor)
    }

    pub fn cursor(&self) -> Result<InSpot> {
        load_cursor(&self.paths.cursor_path)
    }
}
