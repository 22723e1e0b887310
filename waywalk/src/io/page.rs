//! Page driver abstraction.
//!
//! The [`PageDriver`] trait decouples the interpreter from the browser
//! automation backend. Actions compose these primitives; a failing primitive
//! is an ordinary action failure that the step runner recovers from. Tests use
//! a scripted driver that records calls without touching a browser.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

/// Primitive operations on a live page session.
pub trait PageDriver {
    /// Navigate the session to `url`.
    fn goto(&mut self, url: &str) -> Result<()>;
    /// Close the current page.
    fn close(&mut self) -> Result<()>;
    /// Wait until an element matching `selector` is present.
    fn wait_for_selector(&mut self, selector: &str) -> Result<()>;
    fn click(&mut self, selector: &str) -> Result<()>;
    /// Send keystrokes for `text` to the element.
    fn type_text(&mut self, selector: &str, text: &str) -> Result<()>;
    /// Assign the element's `value` property directly.
    fn set_value(&mut self, selector: &str, text: &str) -> Result<()>;
    /// Assign the element's rendered text directly.
    fn set_inner_text(&mut self, selector: &str, text: &str) -> Result<()>;
    fn inner_text(&mut self, selector: &str) -> Result<String>;
    /// Target of the anchor element matching `selector`.
    fn link_target(&mut self, selector: &str) -> Result<String>;

    /// Block for `duration`. Drivers with their own clock may override this.
    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Driver that only logs each primitive. Reads return empty strings.
///
/// Used by the CLI, where no browser backend is linked in.
#[derive(Debug, Default)]
pub struct TracePage {
    /// Skip real sleeps when set.
    pub skip_pauses: bool,
}

impl PageDriver for TracePage {
    fn goto(&mut self, url: &str) -> Result<()> {
        info!(url, "page goto");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        info!("page close");
        Ok(())
    }

    fn wait_for_selector(&mut self, selector: &str) -> Result<()> {
        info!(selector, "page wait for selector");
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        info!(selector, "page click");
        Ok(())
    }

    fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        info!(selector, chars = text.chars().count(), "page type");
        Ok(())
    }

    fn set_value(&mut self, selector: &str, text: &str) -> Result<()> {
        info!(selector, chars = text.chars().count(), "page set value");
        Ok(())
    }

    fn set_inner_text(&mut self, selector: &str, text: &str) -> Result<()> {
        info!(selector, chars = text.chars().count(), "page set inner text");
        Ok(())
    }

    fn inner_text(&mut self, selector: &str) -> Result<String> {
        info!(selector, "page read inner text");
        Ok(String::new())
    }

    fn link_target(&mut self, selector: &str) -> Result<String> {
        info!(selector, "page read link target");
        Ok(String::new())
    }

    fn pause(&mut self, duration: Duration) {
        info!(millis = duration.as_millis() as u64, "page pause");
        if !self.skip_pauses {
            thread::sleep(duration);
        }
    }
}
