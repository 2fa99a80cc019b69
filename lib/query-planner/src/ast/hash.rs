use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::operation::{OperationDefinition, OperationKind, VariableDefinition};
use super::selection_item::SelectionItem;
use super::selection_set::{FieldSelection, InlineFragmentSelection, SelectionSet};
use super::type_node::TypeNode;
use super::value::Value;

/// Order-dependent structural hashing. Positions are never part of the hash;
/// two structurally identical nodes always hash identically, which is what
/// gives selection sets a stable identity across plan branches.
pub trait AstHash {
    fn ast_hash<H: Hasher>(&self, hasher: &mut H);
}

pub fn ast_hash(operation: &OperationDefinition) -> u64 {
    // DefaultHasher::new() uses fixed keys, so hashes are stable within and
    // across planning calls in the same build.
    let mut hasher = DefaultHasher::new();
    operation.ast_hash(&mut hasher);
    hasher.finish()
}

pub fn selection_set_hash(selection_set: &SelectionSet) -> u64 {
    let mut hasher = DefaultHasher::new();
    selection_set.ast_hash(&mut hasher);
    hasher.finish()
}

impl AstHash for OperationDefinition {
    fn ast_hash<H: Hasher>(&self, hasher: &mut H) {
        self.operation_kind.ast_hash(hasher);
        self.name.hash(hasher);
        for variable in &self.variable_definitions {
            variable.ast_hash(hasher);
        }
        self.selection_set.ast_hash(hasher);
    }
}

impl AstHash for OperationKind {
    fn ast_hash<H: Hasher>(&self, hasher: &mut H) {
        match self {
            OperationKind::Query => "query".hash(hasher),
            OperationKind::Mutation => "mutation".hash(hasher),
            OperationKind::Subscription => "subscription".hash(hasher),
        }
    }
}

impl AstHash for SelectionSet {
    fn ast_hash<H: Hasher>(&self, hasher: &mut H) {
        for item in &self.items {
            item.ast_hash(hasher);
        }
    }
}

impl AstHash for SelectionItem {
    fn ast_hash<H: Hasher>(&self, hasher: &mut H) {
        match self {
            SelectionItem::Field(field) => field.ast_hash(hasher),
            SelectionItem::InlineFragment(fragment) => fragment.ast_hash(hasher),
        }
    }
}

impl AstHash for FieldSelection {
    fn ast_hash<H: Hasher>(&self, hasher: &mut H) {
        self.name.hash(hasher);
        self.alias.hash(hasher);
        self.requirement_only.hash(hasher);
        for (name, value) in &self.arguments {
            name.hash(hasher);
            value.ast_hash(hasher);
        }
        self.selections.ast_hash(hasher);
    }
}

impl AstHash for InlineFragmentSelection {
    fn ast_hash<H: Hasher>(&self, hasher: &mut H) {
        "...".hash(hasher);
        self.type_condition.hash(hasher);
        self.requirement_only.hash(hasher);
        self.selections.ast_hash(hasher);
    }
}

impl AstHash for VariableDefinition {
    fn ast_hash<H: Hasher>(&self, hasher: &mut H) {
        self.name.hash(hasher);
        self.variable_type.ast_hash(hasher);
        if let Some(default_value) = &self.default_value {
            default_value.ast_hash(hasher);
        }
    }
}

impl AstHash for TypeNode {
    fn ast_hash<H: Hasher>(&self, hasher: &mut H) {
        match self {
            TypeNode::Named(name) => name.hash(hasher),
            TypeNode::List(inner) => {
                "list".hash(hasher);
                inner.ast_hash(hasher);
            }
            TypeNode::NonNull(inner) => {
                "non_null".hash(hasher);
                inner.ast_hash(hasher);
            }
        }
    }
}

impl AstHash for Value {
    fn ast_hash<H: Hasher>(&self, hasher: &mut H) {
        match self {
            Value::List(values) => {
                for value in values {
                    value.ast_hash(hasher);
                }
            }
            Value::Object(map) => {
                for (name, value) in map {
                    name.hash(hasher);
                    value.ast_hash(hasher);
                }
            }
            Value::Null => "null".hash(hasher),
            Value::Int(value) => value.hash(hasher),
            Value::Float(value) => value.to_bits().hash(hasher),
            Value::Enum(value) => value.hash(hasher),
            Value::Boolean(value) => value.hash(hasher),
            Value::String(value) => value.hash(hasher),
            Value::Variable(value) => value.hash(hasher),
        }
    }
}
