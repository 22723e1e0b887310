//! Action dispatch table: one function per [`ActionKind`].
//!
//! Page actions are composed from [`PageDriver`] primitives; pocket actions
//! only touch the scratch store. Every action reports failure through
//! `anyhow::Error`, which the step runner turns into a catch way.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use tracing::debug;

use crate::core::model::{ActionKind, Step};
use crate::core::pockets::Pockets;
use crate::io::page::PageDriver;

/// Everything an action may touch while it runs.
pub struct Session<'a> {
    pub page: &'a mut dyn PageDriver,
    pub pockets: &'a mut Pockets,
    /// Pause after `openPage` so the navigation can settle.
    pub settle: Duration,
}

impl<'a> Session<'a> {
    pub fn new(page: &'a mut dyn PageDriver, pockets: &'a mut Pockets, settle: Duration) -> Self {
        Self {
            page,
            pockets,
            settle,
        }
    }

    fn pocket(&self, name: &str) -> Result<String> {
        self.pockets
            .get(name)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("pocket '{name}' not found"))
    }
}

pub type ActionFn = fn(&mut Session<'_>, &Step) -> Result<()>;

/// Maps action kinds to their implementations.
#[derive(Clone)]
pub struct ActionTable {
    entries: HashMap<ActionKind, ActionFn>,
}

impl ActionTable {
    /// A table with no actions registered.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The table with every built-in action.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for kind in ActionKind::ALL {
            table.register(kind, builtin(kind));
        }
        table
    }

    pub fn register(&mut self, kind: ActionKind, action: ActionFn) {
        self.entries.insert(kind, action);
    }

    pub fn get(&self, kind: ActionKind) -> Option<ActionFn> {
        self.entries.get(&kind).copied()
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn builtin(kind: ActionKind) -> ActionFn {
    match kind {
        ActionKind::OpenPage => open_page,
        ActionKind::ClosePage => close_page,
        ActionKind::Stop => stop,
        ActionKind::Click => click,
        ActionKind::Type => type_pocket,
        ActionKind::TypePass => type_pass,
        ActionKind::Paste => paste,
        ActionKind::PasteText => paste_text,
        ActionKind::CopyText => copy_text,
        ActionKind::CopyLinck => copy_link,
        ActionKind::PoketExtract => pocket_extract,
        ActionKind::PoketRefine => pocket_refine,
        ActionKind::DuplicatePocket => duplicate_pocket,
        ActionKind::Chek => check,
        ActionKind::None => none,
    }
}

/// Leading decimal digits of `payload` as milliseconds, so `"500ms"` reads
/// as 500. Empty or non-numeric payloads mean no delay.
fn millis(payload: &str) -> Duration {
    let digits: String = payload
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    Duration::from_millis(digits.parse().unwrap_or(0))
}

fn pattern(payload: &str) -> Result<Regex> {
    Regex::new(payload).with_context(|| format!("invalid pattern '{payload}'"))
}

/// Navigate to the URL stored in the pocket named by `payload`.
fn open_page(session: &mut Session<'_>, step: &Step) -> Result<()> {
    let url = session.pocket(&step.payload)?;
    session.page.goto(&url)?;
    session.page.pause(session.settle);
    Ok(())
}

fn close_page(session: &mut Session<'_>, _step: &Step) -> Result<()> {
    session.page.close()
}

/// Wait `payload` milliseconds.
fn stop(session: &mut Session<'_>, step: &Step) -> Result<()> {
    session.page.pause(millis(&step.payload));
    Ok(())
}

fn click(session: &mut Session<'_>, step: &Step) -> Result<()> {
    session.page.wait_for_selector(&step.selector)?;
    session.page.click(&step.selector)
}

/// Type the content of the pocket named by `payload` into `selector`.
fn type_pocket(session: &mut Session<'_>, step: &Step) -> Result<()> {
    let text = session.pocket(&step.payload)?;
    session.page.wait_for_selector(&step.selector)?;
    session.page.type_text(&step.selector, &text)
}

/// Type the content of `pocket` one character at a time, waiting `payload`
/// milliseconds before each character.
fn type_pass(session: &mut Session<'_>, step: &Step) -> Result<()> {
    let text = session.pocket(&step.pocket)?;
    let delay = millis(&step.payload);
    session.page.wait_for_selector(&step.selector)?;
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        session.page.pause(delay);
        session
            .page
            .type_text(&step.selector, ch.encode_utf8(&mut buf))?;
    }
    Ok(())
}

/// Set the field value to all but the last character, then type the last
/// character so the page sees a real input event.
fn paste(session: &mut Session<'_>, step: &Step) -> Result<()> {
    let pocketed = session.pockets.get(&step.pocket).unwrap_or_default();
    if session.pockets.get(&step.pocket).is_none() && step.payload.is_empty() {
        return Err(anyhow!("pocket '{}' not found and no payload", step.pocket));
    }
    let text = if pocketed.is_empty() {
        step.payload.clone()
    } else {
        pocketed.to_string()
    };
    session.page.wait_for_selector(&step.selector)?;
    let (head, tail) = split_last_char(&text);
    session.page.set_value(&step.selector, head)?;
    session.page.type_text(&step.selector, tail)
}

fn split_last_char(text: &str) -> (&str, &str) {
    match text.char_indices().last() {
        Some((idx, _)) => text.split_at(idx),
        None => ("", ""),
    }
}

/// Replace an editable element's text with the pocket named by `payload`,
/// then type a space to trigger the page's input handlers.
fn paste_text(session: &mut Session<'_>, step: &Step) -> Result<()> {
    let text = session.pocket(&step.payload)?;
    session.page.wait_for_selector(&step.selector)?;
    session.page.set_inner_text(&step.selector, &text)?;
    session.page.type_text(&step.selector, " ")
}

fn copy_text(session: &mut Session<'_>, step: &Step) -> Result<()> {
    session.page.wait_for_selector(&step.selector)?;
    let text = session.page.inner_text(&step.selector)?;
    debug!(pocket = %step.pocket, text = %text, "copied text");
    session.pockets.put(step.pocket.clone(), text);
    Ok(())
}

/// Store the anchor target into the pocket named by `payload`.
fn copy_link(session: &mut Session<'_>, step: &Step) -> Result<()> {
    session.page.wait_for_selector(&step.selector)?;
    let link = session.page.link_target(&step.selector)?;
    session.pockets.put(step.payload.clone(), link);
    Ok(())
}

/// Overwrite `pocket` with the first match of `payload` against its content.
fn pocket_extract(session: &mut Session<'_>, step: &Step) -> Result<()> {
    let content = session.pocket(&step.pocket)?;
    let re = pattern(&step.payload)?;
    let extracted = re
        .find(&content)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    session.pockets.put(step.pocket.clone(), extracted);
    Ok(())
}

/// Replace every occurrence of the literal text `payload` in `pocket` with
/// the content of the pocket named by `selector`, or remove the occurrences
/// if that pocket is absent.
fn pocket_refine(session: &mut Session<'_>, step: &Step) -> Result<()> {
    let content = session.pocket(&step.pocket)?;
    let replacement = session.pockets.get(&step.selector).unwrap_or_default();
    let refined = content.replace(&step.payload, replacement);
    session.pockets.put(step.pocket.clone(), refined);
    Ok(())
}

/// Set `pocket` to the content of the pocket named by `selector`, falling back
/// to `payload`, then to the empty string.
fn duplicate_pocket(session: &mut Session<'_>, step: &Step) -> Result<()> {
    let content = match session.pockets.get(&step.selector) {
        Some(source) if !source.is_empty() => source.to_string(),
        _ => step.payload.clone(),
    };
    session.pockets.put(step.pocket.clone(), content);
    Ok(())
}

fn check(session: &mut Session<'_>, step: &Step) -> Result<()> {
    session.page.wait_for_selector(&step.selector)
}

fn none(_session: &mut Session<'_>, _step: &Step) -> Result<()> {
    Ok(())
}
