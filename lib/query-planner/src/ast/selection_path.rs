use std::fmt::Display;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A response path from the operation root, e.g. `viewer.cart.items`.
/// Cloning is cheap, segments are shared.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectionPath {
    inner: Arc<[String]>,
}

impl SelectionPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<String>) -> Self {
        Self {
            inner: segments.into(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.inner
    }

    /// Appends a response key at the end of the path.
    pub fn push(&self, segment: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.inner.len() + 1);
        segments.extend_from_slice(&self.inner);
        segments.push(segment.into());
        Self::new(segments)
    }
}

impl Display for SelectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut iter = self.inner.iter();

        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }

        for segment in iter {
            write!(f, ".{}", segment)?;
        }

        Ok(())
    }
}

impl Serialize for SelectionPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SelectionPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(Self::root());
        }
        Ok(Self::new(raw.split('.').map(str::to_string).collect()))
    }
}
