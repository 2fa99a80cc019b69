use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field selection map describing how a value is extracted from an object,
/// e.g. `dimensions.size`. Relative to the object the requirement is read from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(input: &str) -> Option<Self> {
        let segments: Vec<String> = input
            .split('.')
            .map(str::trim)
            .map(str::to_string)
            .collect();

        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }

        Some(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The selections that must be available on the source object for this
    /// extraction to succeed, as a nested selection set body.
    pub fn to_selection_set(&self) -> crate::ast::selection_set::SelectionSet {
        use crate::ast::selection_set::{FieldSelection, SelectionSet};
        use crate::ast::selection_item::SelectionItem;

        let mut current = SelectionSet::default();
        for segment in self.segments.iter().rev() {
            let field = FieldSelection {
                alias: None,
                name: segment.clone(),
                arguments: Vec::new(),
                requirement_only: false,
                selections: current,
            };
            current = SelectionSet {
                items: vec![SelectionItem::Field(field)],
            };
        }
        current
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FieldPath::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid field path: {raw}")))
    }
}
