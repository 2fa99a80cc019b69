use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::ast::field_path::FieldPath;
use crate::ast::operation::OperationDefinition;
use crate::ast::selection_path::SelectionPath;
use crate::ast::selection_set::SelectionSet;
use crate::ast::type_node::TypeNode;
use crate::utils::pretty_display::{get_indent, PrettyDisplay};

pub type ExecutionNodeId = u32;

/// A variable of a planned source schema operation that is bound at execution
/// time from a prior node's result instead of from client input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequirement {
    /// The synthetic variable name in the node's operation document.
    pub key: String,
    pub variable_type: TypeNode,
    /// Response path of the objects the value is read from.
    pub path: SelectionPath,
    /// How the value is extracted from each object at `path`.
    pub map: FieldPath,
}

/// One source schema request of a finished plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationExecutionNode {
    pub id: ExecutionNodeId,
    pub schema_name: String,
    pub operation_name: String,
    pub operation: OperationDefinition,
    /// Path inside this node's response where the fetched data lives,
    /// e.g. the lookup field wrapping the actual selections.
    pub source: SelectionPath,
    /// Response path where the fetched data is merged into the client result.
    pub target: SelectionPath,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub requirements: Vec<OperationRequirement>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dependencies: Vec<ExecutionNodeId>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dependents: Vec<ExecutionNodeId>,
}

/// Resolves schema introspection selections locally, without contacting any
/// source schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionExecutionNode {
    pub id: ExecutionNodeId,
    pub selections: SelectionSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ExecutionNode {
    Operation(OperationExecutionNode),
    Introspection(IntrospectionExecutionNode),
}

impl ExecutionNode {
    pub fn id(&self) -> ExecutionNodeId {
        match self {
            ExecutionNode::Operation(node) => node.id,
            ExecutionNode::Introspection(node) => node.id,
        }
    }
}

/// The sealed result of planning one client operation: execution nodes wired
/// into a dependency DAG, in a valid execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// The normalized client operation this plan answers.
    pub operation: OperationDefinition,
    /// Nodes without dependencies, where execution starts.
    pub root_node_ids: Vec<ExecutionNodeId>,
    /// Topologically ordered: every node appears after all of its
    /// dependencies.
    pub nodes: Vec<ExecutionNode>,
}

impl OperationPlan {
    pub fn node_by_id(&self, id: ExecutionNodeId) -> Option<&ExecutionNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }
}

impl PrettyDisplay for OperationPlan {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = get_indent(depth);
        writeln!(f, "{indent}plan {{")?;
        for node in &self.nodes {
            node.pretty_fmt(f, depth + 1)?;
        }
        writeln!(f, "{indent}}}")
    }
}

impl PrettyDisplay for ExecutionNode {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = get_indent(depth);
        match self {
            ExecutionNode::Operation(node) => {
                write!(f, "{indent}node {} on {}", node.id, node.schema_name)?;
                if !node.target.is_root() {
                    write!(f, " at {}", node.target)?;
                }
                if !node.dependencies.is_empty() {
                    write!(f, " after [")?;
                    for (i, dependency) in node.dependencies.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", dependency)?;
                    }
                    write!(f, "]")?;
                }
                writeln!(f, " {{")?;
                for requirement in &node.requirements {
                    writeln!(
                        f,
                        "{}requires ${}: {} from {} via {}",
                        get_indent(depth + 1),
                        requirement.key,
                        requirement.variable_type,
                        if requirement.path.is_root() {
                            "<root>".to_string()
                        } else {
                            requirement.path.to_string()
                        },
                        requirement.map,
                    )?;
                }
                writeln!(f, "{}{}", get_indent(depth + 1), node.operation)?;
                writeln!(f, "{indent}}}")
            }
            ExecutionNode::Introspection(node) => {
                writeln!(f, "{indent}introspection {} {}", node.id, node.selections)
            }
        }
    }
}

impl Display for OperationPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.pretty_fmt(f, 0)
    }
}
