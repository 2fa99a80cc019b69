use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::instrument;

use crate::ast::operation::{OperationDefinition, VariableDefinition};
use crate::ast::selection_set::SelectionSet;
use crate::planner::plan::{
    ExecutionNode, ExecutionNodeId, IntrospectionExecutionNode, OperationExecutionNode,
    OperationPlan, OperationRequirement,
};
use crate::planner::steps::{StepId, StepList};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionTreeError {
    #[error("the planned steps form a dependency cycle")]
    DependencyCycle,
}

/// Materializes the winning plan candidate into the sealed execution DAG:
/// nodes in a valid execution order, dependency edges in both directions, and
/// each node's operation document finalized with its variable definitions.
#[instrument(level = "debug", skip_all, fields(steps = steps.len()))]
pub fn build_execution_tree(
    client_operation: &OperationDefinition,
    short_hash: &str,
    steps: &StepList,
    introspection: Option<SelectionSet>,
) -> Result<OperationPlan, ExecutionTreeError> {
    let live: Vec<_> = steps
        .iter()
        .filter(|step| !step.definition.selection_set.is_empty())
        .collect();

    let mut graph: DiGraph<StepId, ()> = DiGraph::new();
    let mut graph_ids: BTreeMap<StepId, NodeIndex> = BTreeMap::new();
    for step in &live {
        graph_ids.insert(step.id, graph.add_node(step.id));
    }

    for step in &live {
        for dependent in &step.dependents {
            if let Some(target) = graph_ids.get(dependent) {
                graph.add_edge(graph_ids[&step.id], *target, ());
            }
        }
    }

    let order = toposort(&graph, None).map_err(|_| ExecutionTreeError::DependencyCycle)?;

    let mut dependencies: BTreeMap<StepId, Vec<ExecutionNodeId>> = BTreeMap::new();
    let mut dependents: BTreeMap<StepId, Vec<ExecutionNodeId>> = BTreeMap::new();
    for edge in graph.raw_edges() {
        let from = graph[edge.source()];
        let to = graph[edge.target()];
        dependencies.entry(to).or_default().push(from);
        dependents.entry(from).or_default().push(to);
    }
    for ids in dependencies.values_mut().chain(dependents.values_mut()) {
        ids.sort_unstable();
        ids.dedup();
    }

    let base_name = client_operation.name.as_deref().unwrap_or("anonymous");
    let mut nodes = Vec::with_capacity(live.len() + 1);
    let mut root_node_ids = Vec::new();

    for graph_id in order {
        let step_id = graph[graph_id];
        let step = steps.by_id(step_id).expect("live step exists");

        let node_dependencies = dependencies.remove(&step_id).unwrap_or_default();
        let node_dependents = dependents.remove(&step_id).unwrap_or_default();
        if node_dependencies.is_empty() {
            root_node_ids.push(step_id);
        }

        let operation_name = format!("{}_{}_{}", base_name, short_hash, step_id);
        let mut definition = step.definition.clone();
        definition.name = Some(operation_name.clone());
        definition.variable_definitions =
            variable_definitions_for(&definition, &step.requirements, client_operation);

        nodes.push(ExecutionNode::Operation(OperationExecutionNode {
            id: step_id,
            schema_name: step.schema_name.clone(),
            operation_name,
            operation: definition,
            source: step.source.clone(),
            target: step.target.clone(),
            requirements: step.requirements.values().cloned().collect(),
            dependencies: node_dependencies,
            dependents: node_dependents,
        }));
    }

    if let Some(selections) = introspection {
        let id = nodes.iter().map(ExecutionNode::id).max().unwrap_or(0) + 1;
        root_node_ids.push(id);
        nodes.push(ExecutionNode::Introspection(IntrospectionExecutionNode {
            id,
            selections,
        }));
    }

    Ok(OperationPlan {
        operation_name: client_operation.name.clone(),
        operation: client_operation.clone(),
        root_node_ids,
        nodes,
    })
}

/// Requirement variables come first, sorted by key, followed by the client
/// variables the operation body still references, forwarded with their
/// original types and defaults.
fn variable_definitions_for(
    definition: &OperationDefinition,
    requirements: &BTreeMap<String, OperationRequirement>,
    client_operation: &OperationDefinition,
) -> Vec<VariableDefinition> {
    let usages = definition.variable_usages();

    let mut variables: Vec<VariableDefinition> = requirements
        .values()
        .map(|requirement| VariableDefinition {
            name: requirement.key.clone(),
            variable_type: requirement.variable_type.clone(),
            default_value: None,
        })
        .collect();

    for client_variable in &client_operation.variable_definitions {
        if usages.contains(&client_variable.name) {
            variables.push(client_variable.clone());
        }
    }

    variables
}
