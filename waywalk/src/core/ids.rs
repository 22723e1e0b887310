//! Prefixed definition identifiers (`Step>…`, `Way>…`, `Detour>…`).
//!
//! Identifiers are parsed once when definitions are loaded, so traversal code
//! matches on [`RefKind`] instead of inspecting string prefixes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SEPARATOR: char = '>';

/// The definition kind an identifier points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefKind {
    Step,
    Way,
    Detour,
}

impl RefKind {
    pub fn prefix(self) -> &'static str {
        match self {
            RefKind::Step => "Step",
            RefKind::Way => "Way",
            RefKind::Detour => "Detour",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Identifier whose prefix is missing or not one of the known kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid identifier '{0}'")]
pub struct InvalidId(pub String);

/// A parsed identifier: kind plus the local part after `>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefId {
    kind: RefKind,
    local: String,
}

impl RefId {
    pub fn new(kind: RefKind, local: impl Into<String>) -> Self {
        Self {
            kind,
            local: local.into(),
        }
    }

    pub fn step(local: impl Into<String>) -> Self {
        Self::new(RefKind::Step, local)
    }

    pub fn way(local: impl Into<String>) -> Self {
        Self::new(RefKind::Way, local)
    }

    pub fn detour(local: impl Into<String>) -> Self {
        Self::new(RefKind::Detour, local)
    }

    pub fn kind(&self) -> RefKind {
        self.kind
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    /// Same local id under another kind (`Detour>x` -> `Way>x`).
    pub fn with_kind(&self, kind: RefKind) -> Self {
        Self::new(kind, self.local.clone())
    }
}

impl FromStr for RefId {
    type Err = InvalidId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (prefix, local) = raw
            .split_once(SEPARATOR)
            .ok_or_else(|| InvalidId(raw.to_string()))?;
        let kind = match prefix {
            "Step" => RefKind::Step,
            "Way" => RefKind::Way,
            "Detour" => RefKind::Detour,
            _ => return Err(InvalidId(raw.to_string())),
        };
        if local.is_empty() {
            return Err(InvalidId(raw.to_string()));
        }
        Ok(Self::new(kind, local))
    }
}

impl TryFrom<String> for RefId {
    type Error = InvalidId;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<RefId> for String {
    fn from(id: RefId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind.prefix(), SEPARATOR, self.local)
    }
}
