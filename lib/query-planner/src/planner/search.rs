use std::cmp::Ordering;
use std::collections::{BinaryHeap, BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::ast::operation::{OperationDefinition, OperationKind};
use crate::ast::selection_item::SelectionItem;
use crate::ast::selection_path::SelectionPath;
use crate::ast::selection_set::{FieldSelection, SelectionSet};
use crate::ast::value::Value;
use crate::planner::inline::{inline_into_step, inline_requirements};
use crate::planner::partition::{partition_selection_set, PartitionInput, Partitioned};
use crate::planner::plan::OperationRequirement;
use crate::planner::plan_node::PlanNode;
use crate::planner::selection_index::SelectionSetIndex;
use crate::planner::steps::{OperationPlanStep, StepId};
use crate::planner::work_item::{Backlog, WorkItem};
use crate::state::composite_schema::CompositeSchemaState;
use crate::state::metadata::Lookup;
use crate::utils::cancellation::{CancellationError, CancellationToken};

#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("no combination of source schemas can resolve the operation")]
    Unplannable,
    #[error("the root type for a {0} operation is not defined")]
    UndefinedRootType(OperationKind),
    #[error(transparent)]
    Cancelled(#[from] CancellationError),
}

/// Explores plan candidates cheapest-first until one empties its backlog.
/// Schema and lookup choices are branched when a work item is enqueued, so
/// the cost of a choice is paid before the work it implies is done.
#[instrument(level = "debug", skip_all, fields(
    operation = operation.name.as_deref().unwrap_or("anonymous"),
))]
pub fn plan_search(
    state: &CompositeSchemaState,
    operation: Arc<OperationDefinition>,
    cancellation: &CancellationToken,
) -> Result<PlanNode, SearchError> {
    let index = SelectionSetIndex::for_operation(&operation);
    let backlog = initial_backlog(state, &operation)?;
    let initial = PlanNode::new(operation, index, backlog);

    let mut queue = BinaryHeap::new();
    let mut seq = 0u64;
    let mut tick = cancellation.throttled(64);

    enqueue(&mut queue, &mut seq, state, initial);

    while let Some(entry) = queue.pop() {
        tick.bail_if_cancelled()?;

        let node = entry.node;
        let Some((item, backlog)) = node.backlog.pop() else {
            debug!(
                steps = node.steps.len(),
                cost = node.path_cost,
                "plan search finished"
            );
            return Ok(node);
        };

        let successor = match item {
            WorkItem::Root {
                type_name,
                selections,
                schema_name: Some(schema_name),
            } => handle_root(state, &node, backlog, &type_name, &selections, &schema_name),
            WorkItem::Lookup {
                type_name,
                path,
                selections,
                selection_set_id,
                lookup: Some(lookup),
                dependent,
            } => handle_lookup(
                state,
                &node,
                backlog,
                &type_name,
                path,
                &selections,
                selection_set_id,
                &lookup,
                dependent,
            ),
            WorkItem::FieldRequirement {
                step_id,
                field,
                declaring_type,
                requirements,
                path,
                selection_set_id,
            } => handle_field_requirement(
                state,
                &node,
                backlog,
                step_id,
                field,
                &declaring_type,
                &requirements,
                path,
                selection_set_id,
            ),
            // Unbranched items never reach the dispatch loop.
            WorkItem::Root {
                schema_name: None, ..
            }
            | WorkItem::Lookup { lookup: None, .. } => None,
        };

        match successor {
            Some(successor) => enqueue(&mut queue, &mut seq, state, successor),
            None => trace!("dead plan candidate dropped"),
        }
    }

    Err(SearchError::Unplannable)
}

/// Mutations are sliced into one work item per root field so every field gets
/// its own step, preserving the serial execution the client asked for. Items
/// are pushed in reverse so the backlog pops them in document order.
fn initial_backlog(
    state: &CompositeSchemaState,
    operation: &OperationDefinition,
) -> Result<Backlog, SearchError> {
    let root_type = state
        .root_type_name(operation.operation_kind)
        .ok_or(SearchError::UndefinedRootType(operation.operation_kind))?
        .to_string();

    let mut backlog = Backlog::empty();

    if operation.operation_kind == OperationKind::Mutation {
        for item in operation.selection_set.items.iter().rev() {
            backlog = backlog.push(WorkItem::Root {
                type_name: root_type.clone(),
                selections: SelectionSet::of(vec![item.clone()]),
                schema_name: None,
            });
        }
    } else {
        backlog = backlog.push(WorkItem::Root {
            type_name: root_type,
            selections: operation.selection_set.clone(),
            schema_name: None,
        });
    }

    Ok(backlog)
}

fn handle_root(
    state: &CompositeSchemaState,
    node: &PlanNode,
    backlog: Backlog,
    type_name: &str,
    selections: &SelectionSet,
    schema_name: &str,
) -> Option<PlanNode> {
    let partitioned = partition_selection_set(
        state,
        &node.index,
        PartitionInput {
            schema_name,
            type_name,
            selection_set: selections,
            path: SelectionPath::root(),
        },
    );

    // A schema that resolves nothing here is a dead branch. Withheld fields
    // still count: their step starts empty and fills up once the requirement
    // is planned.
    if partitioned.resolvable.is_none() && partitioned.fields_with_requirements.is_empty() {
        return None;
    }
    let resolvable = partitioned.resolvable.clone().unwrap_or_default();

    let step_id = node.steps.next_id();
    let root_selection_set_id = partitioned.index.get_id(selections).unwrap_or_default();
    let mut selection_sets = BTreeSet::new();
    partitioned.index.collect_ids(&resolvable, &mut selection_sets);
    selection_sets.insert(root_selection_set_id);

    let step = OperationPlanStep {
        id: step_id,
        schema_name: schema_name.to_string(),
        type_name: type_name.to_string(),
        definition: OperationDefinition {
            name: None,
            operation_kind: node.operation.operation_kind,
            variable_definitions: Vec::new(),
            selection_set: resolvable,
        },
        root_selection_set_id,
        selection_sets,
        target: SelectionPath::root(),
        source: SelectionPath::root(),
        dependents: BTreeSet::new(),
        requirements: BTreeMap::new(),
    };

    let steps = node.steps.add(step);
    let backlog = push_partition_work(backlog, &partitioned, step_id, Some(type_name));

    Some(node.advance(steps, backlog, partitioned.index, 0.0))
}

#[allow(clippy::too_many_arguments)]
fn handle_lookup(
    state: &CompositeSchemaState,
    node: &PlanNode,
    backlog: Backlog,
    type_name: &str,
    path: SelectionPath,
    selections: &SelectionSet,
    selection_set_id: u32,
    lookup: &Arc<Lookup>,
    dependent: Option<StepId>,
) -> Option<PlanNode> {
    let partitioned = partition_selection_set(
        state,
        &node.index,
        PartitionInput {
            schema_name: &lookup.schema_name,
            type_name,
            selection_set: selections,
            path: path.clone(),
        },
    );

    if partitioned.resolvable.is_none() && partitioned.fields_with_requirements.is_empty() {
        return None;
    }
    let resolvable = partitioned.resolvable.clone().unwrap_or_default();

    let mut node = node.clone();
    let key = node.next_requirement_key();

    let mut arguments = Vec::with_capacity(lookup.arguments.len());
    let mut requirements = BTreeMap::new();
    for argument in &lookup.arguments {
        let variable = format!("{}_{}", key, argument.name);
        arguments.push((argument.name.clone(), Value::Variable(variable.clone())));
        requirements.insert(
            variable.clone(),
            OperationRequirement {
                key: variable,
                variable_type: argument.argument_type.clone(),
                path: path.clone(),
                map: argument.map.clone(),
            },
        );
    }

    let wrapper = FieldSelection {
        alias: None,
        name: lookup.field_name.clone(),
        arguments,
        requirement_only: false,
        selections: resolvable.clone(),
    };
    let definition_set = SelectionSet::of(vec![SelectionItem::Field(wrapper)]);

    let mut builder = partitioned.index.to_builder();
    builder.insert_recursive(&definition_set);
    let index = builder.build();

    let mut selection_sets = BTreeSet::new();
    index.collect_ids(&resolvable, &mut selection_sets);
    selection_sets.insert(selection_set_id);

    let step_id = node.steps.next_id();
    let mut dependents = BTreeSet::new();
    if let Some(dependent) = dependent {
        dependents.insert(dependent);
    }

    let step = OperationPlanStep {
        id: step_id,
        schema_name: lookup.schema_name.clone(),
        type_name: type_name.to_string(),
        definition: OperationDefinition {
            name: None,
            operation_kind: OperationKind::Query,
            variable_definitions: Vec::new(),
            selection_set: definition_set,
        },
        root_selection_set_id: selection_set_id,
        selection_sets,
        target: path.clone(),
        source: SelectionPath::new(vec![lookup.field_name.clone()]),
        dependents,
        requirements,
    };

    let steps = node.steps.add(step);
    let mut backlog = backlog;

    // The key fields are taken from the steps that fetch the objects being
    // looked up, each contributing what its schema resolves. Whatever no
    // committed step can deliver is chained as another lookup in front of
    // this one.
    let (steps, index, remainder) = inline_requirements(
        state,
        &steps,
        &index,
        step_id,
        type_name,
        selection_set_id,
        &path,
        &lookup.key_selections,
    );
    if let Some(remainder) = remainder {
        backlog = backlog.push(WorkItem::Lookup {
            type_name: type_name.to_string(),
            path: path.clone(),
            selections: mark_requirement_only(&remainder),
            selection_set_id,
            lookup: None,
            dependent: Some(step_id),
        });
    }

    let backlog = push_partition_work(backlog, &partitioned, step_id, None);

    Some(node.advance(steps, backlog, index, 0.0))
}

#[allow(clippy::too_many_arguments)]
fn handle_field_requirement(
    state: &CompositeSchemaState,
    node: &PlanNode,
    backlog: Backlog,
    step_id: StepId,
    field: FieldSelection,
    declaring_type: &str,
    requirements: &crate::state::metadata::FieldRequirements,
    path: SelectionPath,
    selection_set_id: u32,
) -> Option<PlanNode> {
    let mut node = node.clone();
    let key = node.next_requirement_key();

    let mut arguments = field.arguments.clone();
    let mut requirement_entries = Vec::new();

    for argument in &requirements.arguments {
        let Some(map) = &argument.map else {
            // Exposed on the composite schema, the client value is already in
            // the field's argument list.
            continue;
        };

        let variable = format!("{}_{}", key, argument.name);
        arguments.retain(|(name, _)| name != &argument.name);
        arguments.push((argument.name.clone(), Value::Variable(variable.clone())));
        requirement_entries.push(OperationRequirement {
            key: variable,
            variable_type: argument.argument_type.clone(),
            path: path.clone(),
            map: map.clone(),
        });
    }

    let bound_field = FieldSelection {
        arguments,
        ..field
    };
    let addition = SelectionSet::of(vec![SelectionItem::Field(bound_field)]);

    // Put the withheld field back into its step, now that its arguments are
    // bound to requirement variables.
    let (steps, index) = inline_into_step(
        &node.steps,
        &node.index,
        step_id,
        None,
        &path,
        &addition,
        false,
    )?;

    let consumer = steps.by_id(step_id)?;
    let mut consumer = OperationPlanStep::clone(consumer);
    for entry in requirement_entries {
        consumer.requirements.insert(entry.key.clone(), entry);
    }
    let steps = steps.set(consumer);
    let mut backlog = backlog;

    let (steps, index, remainder) = inline_requirements(
        state,
        &steps,
        &index,
        step_id,
        declaring_type,
        selection_set_id,
        &path,
        &requirements.selections,
    );
    if let Some(remainder) = remainder {
        backlog = backlog.push(WorkItem::Lookup {
            type_name: declaring_type.to_string(),
            path: path.clone(),
            selections: mark_requirement_only(&remainder),
            selection_set_id,
            lookup: None,
            dependent: Some(step_id),
        });
    }

    Some(node.advance(steps, backlog, index, 0.0))
}

/// Turns the leftovers of a partition into new work. Field requirements are
/// pushed first, then scopes in reverse, so the backlog pops scopes in the
/// order the partitioner emitted them and requirements last, when the steps
/// they could inline into exist.
fn push_partition_work(
    mut backlog: Backlog,
    partitioned: &Partitioned,
    step_id: StepId,
    root_type: Option<&str>,
) -> Backlog {
    for field in partitioned.fields_with_requirements.iter().rev() {
        backlog = backlog.push(WorkItem::FieldRequirement {
            step_id,
            field: field.field.clone(),
            declaring_type: field.declaring_type.clone(),
            requirements: field.requirements.clone(),
            path: field.path.clone(),
            selection_set_id: field.selection_set_id,
        });
    }

    for scope in partitioned.unresolvable.iter().rev() {
        // Root leftovers cannot be looked up, they become another root fetch
        // against a different schema.
        if scope.path.is_root() && Some(scope.type_name.as_str()) == root_type {
            backlog = backlog.push(WorkItem::Root {
                type_name: scope.type_name.clone(),
                selections: scope.selections.clone(),
                schema_name: None,
            });
        } else {
            backlog = backlog.push(WorkItem::Lookup {
                type_name: scope.type_name.clone(),
                path: scope.path.clone(),
                selections: scope.selections.clone(),
                selection_set_id: scope.selection_set_id,
                lookup: None,
                dependent: None,
            });
        }
    }

    backlog
}

fn mark_requirement_only(selections: &SelectionSet) -> SelectionSet {
    SelectionSet::of(
        selections
            .items
            .iter()
            .map(SelectionItem::with_requirement_only)
            .collect(),
    )
}

struct QueueEntry {
    cost: f64,
    seq: u64,
    node: PlanNode,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost.to_bits() == other.cost.to_bits() && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // BinaryHeap is a max-heap; reverse so the cheapest candidate pops first,
    // insertion order breaking ties for determinism.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

enum PendingChoice {
    Resolved,
    Schemas(Vec<(String, usize)>),
    Lookups(Vec<(Arc<Lookup>, usize)>),
}

/// Inserts a plan candidate into the queue. When the candidate's next work
/// item still has an open schema or lookup choice, one entry per alternative
/// is inserted instead, each carrying the cost of its choice. A schema that
/// resolves `n` of the requested selections costs `2 / n`, so candidates that
/// cover more of the work are explored first. Every lookup adds one more
/// round trip and costs an extra `1`.
fn enqueue(
    queue: &mut BinaryHeap<QueueEntry>,
    seq: &mut u64,
    state: &CompositeSchemaState,
    node: PlanNode,
) {
    let choice = match node.backlog.peek() {
        None => PendingChoice::Resolved,
        Some(WorkItem::Root {
            type_name,
            selections,
            schema_name: None,
        }) => PendingChoice::Schemas(possible_schemas(state, type_name, selections)),
        Some(WorkItem::Lookup {
            type_name,
            selections,
            lookup: None,
            ..
        }) => PendingChoice::Lookups(possible_lookups(state, type_name, selections)),
        Some(_) => PendingChoice::Resolved,
    };

    match choice {
        PendingChoice::Resolved => {
            push_entry(queue, seq, node);
        }
        PendingChoice::Schemas(candidates) => {
            if candidates.is_empty() {
                return;
            }
            let (item, rest) = node.backlog.pop().expect("peeked backlog is non-empty");

            for (schema, resolvable_count) in candidates {
                let WorkItem::Root {
                    type_name,
                    selections,
                    ..
                } = item.clone()
                else {
                    unreachable!("pending schema choice is always a root item");
                };

                let mut branch = node.clone();
                branch.backlog = rest.push(WorkItem::Root {
                    type_name,
                    selections,
                    schema_name: Some(schema),
                });
                branch.path_cost += choice_cost(resolvable_count);
                push_entry(queue, seq, branch);
            }
        }
        PendingChoice::Lookups(candidates) => {
            if candidates.is_empty() {
                return;
            }
            let (item, rest) = node.backlog.pop().expect("peeked backlog is non-empty");

            for (lookup, resolvable_count) in candidates {
                let WorkItem::Lookup {
                    type_name,
                    path,
                    selections,
                    selection_set_id,
                    dependent,
                    ..
                } = item.clone()
                else {
                    unreachable!("pending lookup choice is always a lookup item");
                };

                let mut branch = node.clone();
                branch.backlog = rest.push(WorkItem::Lookup {
                    type_name,
                    path,
                    selections,
                    selection_set_id,
                    lookup: Some(lookup),
                    dependent,
                });
                // A lookup is one extra round trip on top of the schema visit.
                branch.path_cost += choice_cost(resolvable_count) + 1.0;
                push_entry(queue, seq, branch);
            }
        }
    }
}

fn push_entry(queue: &mut BinaryHeap<QueueEntry>, seq: &mut u64, node: PlanNode) {
    *seq += 1;
    queue.push(QueueEntry {
        cost: node.total_cost(),
        seq: *seq,
        node,
    });
}

/// A choice that resolves more of the requested selections is cheaper, so
/// candidates covering most of the work are explored first.
fn choice_cost(resolvable_count: usize) -> f64 {
    1.0 / resolvable_count as f64 * 2.0
}

/// Schemas that resolve at least one of the requested selections on the type,
/// each with the number of selections it covers.
fn possible_schemas(
    state: &CompositeSchemaState,
    type_name: &str,
    selections: &SelectionSet,
) -> Vec<(String, usize)> {
    let mut counts = BTreeMap::new();
    count_resolvable_selections(state, type_name, selections, &mut counts);
    counts.into_iter().collect()
}

/// Counts, per schema, how many of the requested field selections the schema
/// resolves, descending into sub-selections and inline fragments.
fn count_resolvable_selections(
    state: &CompositeSchemaState,
    type_name: &str,
    selections: &SelectionSet,
    out: &mut BTreeMap<String, usize>,
) {
    for item in &selections.items {
        match item {
            SelectionItem::Field(field) => {
                if field.is_introspection() {
                    continue;
                }
                let Some(field_def) = state
                    .type_def(type_name)
                    .and_then(|type_def| type_def.field(&field.name))
                else {
                    continue;
                };

                for schema in field_def.sources.keys() {
                    *out.entry(schema.clone()).or_default() += 1;
                }

                if !field.is_leaf() {
                    count_resolvable_selections(
                        state,
                        field_def.field_type.named_type(),
                        &field.selections,
                        out,
                    );
                }
            }
            SelectionItem::InlineFragment(fragment) => {
                count_resolvable_selections(
                    state,
                    &fragment.type_condition,
                    &fragment.selections,
                    out,
                );
            }
        }
    }
}

/// Lookups whose schema resolves at least one of the requested selections,
/// ordered by schema and field name for deterministic branching. Each lookup
/// carries its schema's resolvable-selection count.
fn possible_lookups(
    state: &CompositeSchemaState,
    type_name: &str,
    selections: &SelectionSet,
) -> Vec<(Arc<Lookup>, usize)> {
    let Some(type_def) = state.type_def(type_name) else {
        return Vec::new();
    };

    let mut counts = BTreeMap::new();
    count_resolvable_selections(state, type_name, selections, &mut counts);

    let mut candidates = Vec::new();
    for (schema_name, resolvable_count) in &counts {
        for lookup in type_def.lookups(schema_name) {
            candidates.push((lookup.clone(), *resolvable_count));
        }
    }

    candidates.sort_by(|(a, _), (b, _)| {
        (&a.schema_name, &a.field_name).cmp(&(&b.schema_name, &b.field_name))
    });
    candidates
}
