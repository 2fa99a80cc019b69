use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

use super::selection_item::SelectionItem;
use super::value::Value;
use crate::utils::pretty_display::{get_indent, PrettyDisplay};

/// The directive that marks selections inlined purely to satisfy lookup or
/// field-argument requirements. Executors strip them from client output.
pub const REQUIREMENT_DIRECTIVE: &str = "internal";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionSet {
    pub items: Vec<SelectionItem>,
}

impl SelectionSet {
    pub fn of(items: Vec<SelectionItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for SelectionSet {}

impl Display for SelectionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.items.is_empty() {
            return Ok(());
        }

        write!(f, "{{")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "}}")
    }
}

impl PrettyDisplay for SelectionSet {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        for item in &self.items {
            item.pretty_fmt(f, depth)?;
        }
        Ok(())
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct FieldSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub arguments: Vec<(String, Value)>,
    /// Selections carrying this flag exist only to satisfy a requirement and
    /// are not part of the client-visible response.
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub requirement_only: bool,
    #[serde(skip_serializing_if = "SelectionSet::is_empty", default)]
    pub selections: SelectionSet,
}

impl FieldSelection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: Vec::new(),
            requirement_only: false,
            selections: SelectionSet::default(),
        }
    }

    pub fn new_typename() -> Self {
        Self::new("__typename")
    }

    /// The key under which this field appears in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn is_leaf(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn is_introspection(&self) -> bool {
        self.name.starts_with("__")
    }
}

impl Debug for FieldSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSelection")
            .field("name", &self.name)
            .field("selections", &self.selections)
            .finish()
    }
}

impl PartialEq for FieldSelection {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.alias == other.alias
            && self.arguments == other.arguments
            && self.selections == other.selections
    }
}

impl Eq for FieldSelection {}

impl Display for FieldSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(alias) = &self.alias {
            write!(f, "{}: ", alias)?;
        }
        write!(f, "{}", self.name)?;

        if !self.arguments.is_empty() {
            write!(f, "(")?;
            for (i, (name, value)) in self.arguments.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", name, value)?;
            }
            write!(f, ")")?;
        }

        if self.requirement_only {
            write!(f, " @{}", REQUIREMENT_DIRECTIVE)?;
        }

        if !self.selections.is_empty() {
            write!(f, " ")?;
        }

        write!(f, "{}", self.selections)
    }
}

impl PrettyDisplay for FieldSelection {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = get_indent(depth);
        if let Some(alias) = &self.alias {
            write!(f, "{indent}{}: {}", alias, self.name)?;
        } else {
            write!(f, "{indent}{}", self.name)?;
        }
        if self.requirement_only {
            write!(f, " @{}", REQUIREMENT_DIRECTIVE)?;
        }
        if self.selections.is_empty() {
            writeln!(f)
        } else {
            writeln!(f, " {{")?;
            self.selections.pretty_fmt(f, depth + 1)?;
            writeln!(f, "{indent}}}")
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct InlineFragmentSelection {
    pub type_condition: String,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub requirement_only: bool,
    pub selections: SelectionSet,
}

impl Debug for InlineFragmentSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineFragmentSelection")
            .field("type_condition", &self.type_condition)
            .field("selections", &self.selections)
            .finish()
    }
}

impl PartialEq for InlineFragmentSelection {
    fn eq(&self, other: &Self) -> bool {
        self.type_condition == other.type_condition && self.selections == other.selections
    }
}

impl Eq for InlineFragmentSelection {}

impl Display for InlineFragmentSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "... on {}", self.type_condition)?;
        if self.requirement_only {
            write!(f, " @{}", REQUIREMENT_DIRECTIVE)?;
        }
        write!(f, " {}", self.selections)
    }
}

impl PrettyDisplay for InlineFragmentSelection {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = get_indent(depth);
        writeln!(f, "{indent}... on {} {{", self.type_condition)?;
        self.selections.pretty_fmt(f, depth + 1)?;
        writeln!(f, "{indent}}}")
    }
}
