use crate::ast::merge::merge_selection_sets;
use crate::ast::selection_item::SelectionItem;
use crate::ast::selection_path::SelectionPath;
use crate::ast::selection_set::{FieldSelection, InlineFragmentSelection, SelectionSet};
use crate::planner::selection_index::{SelectionSetId, SelectionSetIndex, SelectionSetIndexBuilder};
use crate::planner::steps::{OperationPlanStep, StepId, StepList};
use crate::state::composite_schema::CompositeSchemaState;

/// Distributes a requirement selection set over the steps that already fetch
/// the objects at `path`. Each candidate step takes the part its schema can
/// resolve; whatever no committed step can deliver is returned so the caller
/// can plan a fresh lookup for the remainder only.
///
/// A candidate must already resolve a part of the selection set the objects
/// come from, must sit at or above `path`, and must not depend on `consumer`
/// itself, or inlining would close a dependency cycle.
pub fn inline_requirements(
    state: &CompositeSchemaState,
    steps: &StepList,
    index: &SelectionSetIndex,
    consumer: StepId,
    type_name: &str,
    selection_set_id: SelectionSetId,
    path: &SelectionPath,
    selections: &SelectionSet,
) -> (StepList, SelectionSetIndex, Option<SelectionSet>) {
    let mut steps = steps.clone();
    let mut index = index.clone();
    let mut remaining = Some(selections.clone());

    let candidates: Vec<StepId> = steps.iter().map(|step| step.id).collect();
    for candidate in candidates {
        let Some(pending) = remaining.clone() else {
            break;
        };
        if candidate == consumer || steps.is_dependent_of(candidate, consumer) {
            continue;
        }
        let Some(step) = steps.by_id(candidate) else {
            continue;
        };
        if !step.resolves(selection_set_id) {
            continue;
        }
        if path.segments().strip_prefix(step.target.segments()).is_none() {
            continue;
        }

        let (resolvable, leftover) =
            split_for_schema(state, &step.schema_name, type_name, &pending);
        let Some(resolvable) = resolvable else {
            continue;
        };

        if let Some((updated_steps, updated_index)) =
            inline_into_step(&steps, &index, candidate, Some(consumer), path, &resolvable, true)
        {
            steps = updated_steps;
            index = updated_index;
            remaining = leftover;
        }
    }

    (steps, index, remaining)
}

/// Splits `selections` into the part `schema_name` resolves and the part it
/// does not, preserving nesting on both sides. Both halves stay rooted at the
/// same level so one can be merged into a step and the other re-queued as is.
fn split_for_schema(
    state: &CompositeSchemaState,
    schema_name: &str,
    type_name: &str,
    selections: &SelectionSet,
) -> (Option<SelectionSet>, Option<SelectionSet>) {
    let mut resolvable = Vec::new();
    let mut leftover = Vec::new();

    for item in &selections.items {
        match item {
            SelectionItem::Field(field) => {
                if field.is_introspection() {
                    resolvable.push(item.clone());
                    continue;
                }

                let field_def = state
                    .type_def(type_name)
                    .and_then(|type_def| type_def.field(&field.name));
                let Some(field_def) = field_def else {
                    leftover.push(item.clone());
                    continue;
                };
                // A field whose arguments need binding in this schema cannot
                // be inlined as is.
                if !field_def.is_resolvable_by(schema_name)
                    || field_def.requirements_in(schema_name).is_some()
                {
                    leftover.push(item.clone());
                    continue;
                }
                if field.is_leaf() {
                    resolvable.push(item.clone());
                    continue;
                }

                let (sub_resolvable, sub_leftover) = split_for_schema(
                    state,
                    schema_name,
                    field_def.field_type.named_type(),
                    &field.selections,
                );
                if let Some(sub) = sub_resolvable {
                    resolvable.push(SelectionItem::Field(FieldSelection {
                        selections: sub,
                        ..field.clone()
                    }));
                }
                if let Some(sub) = sub_leftover {
                    leftover.push(SelectionItem::Field(FieldSelection {
                        selections: sub,
                        ..field.clone()
                    }));
                }
            }
            SelectionItem::InlineFragment(fragment) => {
                let (sub_resolvable, sub_leftover) = split_for_schema(
                    state,
                    schema_name,
                    &fragment.type_condition,
                    &fragment.selections,
                );
                if let Some(sub) = sub_resolvable {
                    resolvable.push(SelectionItem::InlineFragment(InlineFragmentSelection {
                        selections: sub,
                        ..fragment.clone()
                    }));
                }
                if let Some(sub) = sub_leftover {
                    leftover.push(SelectionItem::InlineFragment(InlineFragmentSelection {
                        selections: sub,
                        ..fragment.clone()
                    }));
                }
            }
        }
    }

    let wrap = |items: Vec<SelectionItem>| {
        if items.is_empty() {
            None
        } else {
            Some(SelectionSet::of(items))
        }
    };
    (wrap(resolvable), wrap(leftover))
}

/// Merges `additions` into `provider`'s operation at `path` and records that
/// `consumer` now waits for `provider`. When `mark_requirement` is set the
/// added selections are flagged as internal so executors keep them out of the
/// client response.
pub fn inline_into_step(
    steps: &StepList,
    index: &SelectionSetIndex,
    provider: StepId,
    consumer: Option<StepId>,
    path: &SelectionPath,
    additions: &SelectionSet,
    mark_requirement: bool,
) -> Option<(StepList, SelectionSetIndex)> {
    let step = steps.by_id(provider)?;
    let relative = path.segments().strip_prefix(step.target.segments())?;

    // Navigate the step's own document: first through the wrapping source
    // fields, then down the response path.
    let mut segments: Vec<&str> = step.source.segments().iter().map(String::as_str).collect();
    segments.extend(relative.iter().map(String::as_str));

    let additions = if mark_requirement {
        SelectionSet::of(
            additions
                .items
                .iter()
                .map(SelectionItem::with_requirement_only)
                .collect(),
        )
    } else {
        additions.clone()
    };

    let mut builder = index.to_builder();
    let rewritten = merge_at(
        &step.definition.selection_set,
        &segments,
        &additions,
        &mut builder,
    )?;
    builder.insert_recursive(&rewritten);

    let mut updated = OperationPlanStep::clone(step);
    updated.definition.selection_set = rewritten.clone();
    if let Some(consumer) = consumer {
        updated.dependents.insert(consumer);
    }

    let index = builder.build();
    updated.selection_sets.clear();
    index.collect_ids(&rewritten, &mut updated.selection_sets);

    Some((steps.set(updated), index))
}

/// Rewrites `set` with `additions` merged in at the end of `segments`,
/// registering every rewritten level under its original identity. Descends
/// through inline fragments transparently, response paths do not see them.
fn merge_at(
    set: &SelectionSet,
    segments: &[&str],
    additions: &SelectionSet,
    builder: &mut SelectionSetIndexBuilder,
) -> Option<SelectionSet> {
    let Some((head, rest)) = segments.split_first() else {
        let merged = merge_selection_sets(set, additions);
        builder.register(set, &merged);
        return Some(merged);
    };

    for (position, item) in set.items.iter().enumerate() {
        let replacement = match item {
            SelectionItem::Field(field) if field.response_key() == *head => {
                let sub = merge_at(&field.selections, rest, additions, builder)?;
                SelectionItem::Field(FieldSelection {
                    selections: sub,
                    ..field.clone()
                })
            }
            SelectionItem::InlineFragment(fragment) => {
                match merge_at(&fragment.selections, segments, additions, builder) {
                    Some(sub) => SelectionItem::InlineFragment(InlineFragmentSelection {
                        selections: sub,
                        ..fragment.clone()
                    }),
                    None => continue,
                }
            }
            _ => continue,
        };

        let mut items = set.items.clone();
        items[position] = replacement;
        let rewritten = SelectionSet::of(items);
        builder.register(set, &rewritten);
        return Some(rewritten);
    }

    None
}
