use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::hash::ast_hash;
use super::selection_set::SelectionSet;
use super::type_node::TypeNode;
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
            OperationKind::Subscription => write!(f, "subscription"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub operation_kind: OperationKind,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub variable_definitions: Vec<VariableDefinition>,
    pub selection_set: SelectionSet,
}

impl OperationDefinition {
    pub fn hash(&self) -> u64 {
        ast_hash(self)
    }

    /// Names of all variables referenced anywhere in the operation body.
    pub fn variable_usages(&self) -> Vec<String> {
        let mut usages = Vec::new();
        for item in &self.selection_set.items {
            item.variable_usages(&mut usages);
        }
        usages.sort();
        usages.dedup();
        usages
    }
}

impl Display for OperationDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.operation_kind)?;

        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }

        if !self.variable_definitions.is_empty() {
            write!(f, "(")?;
            for (i, variable_definition) in self.variable_definitions.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", variable_definition)?;
            }
            write!(f, ")")?;
        }

        write!(f, " {}", self.selection_set)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    pub variable_type: TypeNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl Display for VariableDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.default_value {
            Some(default_value) => {
                write!(f, "${}: {} = {}", self.name, self.variable_type, default_value)
            }
            None => write!(f, "${}: {}", self.name, self.variable_type),
        }
    }
}
