use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

use super::selection_set::{FieldSelection, InlineFragmentSelection, SelectionSet};
use crate::utils::pretty_display::PrettyDisplay;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SelectionItem {
    Field(FieldSelection),
    InlineFragment(InlineFragmentSelection),
}

impl SelectionItem {
    pub fn selection_set(&self) -> &SelectionSet {
        match self {
            SelectionItem::Field(field) => &field.selections,
            SelectionItem::InlineFragment(fragment) => &fragment.selections,
        }
    }

    pub fn is_requirement_only(&self) -> bool {
        match self {
            SelectionItem::Field(field) => field.requirement_only,
            SelectionItem::InlineFragment(fragment) => fragment.requirement_only,
        }
    }

    pub fn with_requirement_only(&self) -> Self {
        match self {
            SelectionItem::Field(field) => SelectionItem::Field(FieldSelection {
                requirement_only: true,
                ..field.clone()
            }),
            SelectionItem::InlineFragment(fragment) => {
                SelectionItem::InlineFragment(InlineFragmentSelection {
                    requirement_only: true,
                    ..fragment.clone()
                })
            }
        }
    }

    pub fn variable_usages(&self, usages: &mut Vec<String>) {
        if let SelectionItem::Field(field) = self {
            for (_, value) in &field.arguments {
                value.collect_variable_usages(usages);
            }
        }

        for item in &self.selection_set().items {
            item.variable_usages(usages);
        }
    }
}

impl Display for SelectionItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionItem::Field(field) => write!(f, "{}", field),
            SelectionItem::InlineFragment(fragment) => write!(f, "{}", fragment),
        }
    }
}

impl PrettyDisplay for SelectionItem {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        match self {
            SelectionItem::Field(field) => field.pretty_fmt(f, depth),
            SelectionItem::InlineFragment(fragment) => fragment.pretty_fmt(f, depth),
        }
    }
}
