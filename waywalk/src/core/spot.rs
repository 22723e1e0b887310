//! Nested resume positions.
//!
//! A [`Spot`] holds one index per walk depth, outermost first. On disk it is
//! the nested array `[2, [1]]`; on the command line it is `2.1`.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Resume position: index into the current way plus the position inside
/// whatever that index descends into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spot {
    pub index: usize,
    pub inner: Option<Box<Spot>>,
}

impl Spot {
    pub fn at(index: usize) -> Self {
        Self { index, inner: None }
    }

    pub fn nested(index: usize, inner: Spot) -> Self {
        Self {
            index,
            inner: Some(Box::new(inner)),
        }
    }

    /// Build a chain from indices ordered outermost first. Empty means start.
    pub fn from_path(path: &[usize]) -> Self {
        match path.split_first() {
            None => Spot::default(),
            Some((first, [])) => Spot::at(*first),
            Some((first, rest)) => Spot::nested(*first, Spot::from_path(rest)),
        }
    }

    pub fn to_path(&self) -> Vec<usize> {
        let mut path = vec![self.index];
        let mut cursor = self.inner.as_deref();
        while let Some(spot) = cursor {
            path.push(spot.index);
            cursor = spot.inner.as_deref();
        }
        path
    }

    /// Start index for this depth and the spot for the level below it.
    pub fn split(&self) -> (usize, Spot) {
        let inner = self.inner.as_deref().cloned().unwrap_or_default();
        (self.index, inner)
    }

    pub fn is_start(&self) -> bool {
        self.to_path().iter().all(|index| *index == 0)
    }
}

impl fmt::Display for Spot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.to_path().iter().map(usize::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

impl FromStr for Spot {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("empty spot"));
        }
        let path = trimmed
            .split('.')
            .map(|part| {
                part.parse::<usize>()
                    .with_context(|| format!("invalid spot index '{part}' in '{raw}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Spot::from_path(&path))
    }
}

impl Serialize for Spot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.inner.is_some() { 2 } else { 1 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.index)?;
        if let Some(inner) = &self.inner {
            seq.serialize_element(inner.as_ref())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Spot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(SpotVisitor)
    }
}

struct SpotVisitor;

impl<'de> Visitor<'de> for SpotVisitor {
    type Value = Spot;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a nested position array such as [2, [1]]")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Spot, A::Error> {
        let index = seq.next_element::<usize>()?.unwrap_or_default();
        let inner = seq.next_element::<Option<Spot>>()?.flatten();
        if seq.next_element::<serde::de::IgnoredAny>()?.is_some() {
            return Err(serde::de::Error::custom(
                "position array takes at most two elements",
            ));
        }
        Ok(Spot {
            index,
            inner: inner.map(Box::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_nested_arrays() {
        let spot = Spot::nested(2, Spot::at(1));
        assert_eq!(serde_json::to_string(&spot).expect("serialize"), "[2,[1]]");
        let parsed: Spot = serde_json::from_str("[2,[1]]").expect("parse");
        assert_eq!(parsed, spot);
    }

    #[test]
    fn degenerate_arrays_mean_start() {
        assert_eq!(serde_json::from_str::<Spot>("[]").expect("empty"), Spot::default());
        assert_eq!(serde_json::from_str::<Spot>("[0]").expect("zero"), Spot::default());
        assert_eq!(
            serde_json::from_str::<Spot>("[3,null]").expect("null inner"),
            Spot::at(3)
        );
        assert!(serde_json::from_str::<Spot>("[1,[2],3]").is_err());
    }

    #[test]
    fn dotted_form_round_trips_through_display() {
        let spot: Spot = "2.1.4".parse().expect("parse");
        assert_eq!(spot.to_path(), vec![2, 1, 4]);
        assert_eq!(spot.to_string(), "2.1.4");
        assert!("2..1".parse::<Spot>().is_err());
        assert!("".parse::<Spot>().is_err());
    }

    #[test]
    fn split_defaults_missing_inner_to_start() {
        let (start, inner) = Spot::at(5).split();
        assert_eq!(start, 5);
        assert_eq!(inner, Spot::default());

        let (start, inner) = Spot::from_path(&[1, 3]).split();
        assert_eq!(start, 1);
        assert_eq!(inner, Spot::at(3));
    }

    #[test]
    fn from_path_of_empty_slice_is_start() {
        assert!(Spot::from_path(&[]).is_start());
        assert!(!Spot::from_path(&[0, 2]).is_start());
    }
}
