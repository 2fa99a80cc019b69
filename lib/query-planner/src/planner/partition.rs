use std::sync::Arc;

use crate::ast::selection_item::SelectionItem;
use crate::ast::selection_path::SelectionPath;
use crate::ast::selection_set::{FieldSelection, InlineFragmentSelection, SelectionSet};
use crate::planner::selection_index::{SelectionSetId, SelectionSetIndex, SelectionSetIndexBuilder};
use crate::state::composite_schema::CompositeSchemaState;
use crate::state::metadata::FieldRequirements;

/// A contiguous group of selections that one source schema could not resolve,
/// anchored at the selection set it was carved out of. Each scope later turns
/// into a lookup work item.
#[derive(Debug, Clone)]
pub struct SelectionSetScope {
    pub type_name: String,
    pub path: SelectionPath,
    pub selections: SelectionSet,
    pub selection_set_id: SelectionSetId,
}

/// A field the schema can resolve, but only once its argument requirements
/// are bound from data fetched elsewhere. The field is withheld from the
/// step's operation until the requirement is planned.
#[derive(Debug, Clone)]
pub struct FieldWithRequirement {
    pub field: FieldSelection,
    pub declaring_type: String,
    pub requirements: Arc<FieldRequirements>,
    /// Path of the selection set containing the field.
    pub path: SelectionPath,
    pub selection_set_id: SelectionSetId,
}

#[derive(Debug)]
pub struct PartitionInput<'a> {
    pub schema_name: &'a str,
    pub type_name: &'a str,
    pub selection_set: &'a SelectionSet,
    pub path: SelectionPath,
}

#[derive(Debug)]
pub struct Partitioned {
    /// What the schema can fetch in one operation, `None` when nothing is
    /// locally resolvable.
    pub resolvable: Option<SelectionSet>,
    /// Scope for the input selection set first, nested scopes after it.
    pub unresolvable: Vec<SelectionSetScope>,
    pub fields_with_requirements: Vec<FieldWithRequirement>,
    pub index: SelectionSetIndex,
}

/// Splits a selection set between what `schema_name` can resolve and what has
/// to come from other schemas. Rewritten subsets keep the identity of the sets
/// they were carved from, so steps planned against the result still map back
/// onto the original operation.
pub fn partition_selection_set(
    state: &CompositeSchemaState,
    index: &SelectionSetIndex,
    input: PartitionInput<'_>,
) -> Partitioned {
    let mut partitioner = Partitioner {
        state,
        schema_name: input.schema_name,
        index: index.to_builder(),
        unresolvable: Vec::new(),
        fields_with_requirements: Vec::new(),
    };

    let resolvable = partitioner.split(input.type_name, input.selection_set, &input.path);

    Partitioned {
        resolvable,
        unresolvable: partitioner.unresolvable,
        fields_with_requirements: partitioner.fields_with_requirements,
        index: partitioner.index.build(),
    }
}

struct Partitioner<'a> {
    state: &'a CompositeSchemaState,
    schema_name: &'a str,
    index: SelectionSetIndexBuilder,
    unresolvable: Vec<SelectionSetScope>,
    fields_with_requirements: Vec<FieldWithRequirement>,
}

impl Partitioner<'_> {
    fn split(
        &mut self,
        type_name: &str,
        selection_set: &SelectionSet,
        path: &SelectionPath,
    ) -> Option<SelectionSet> {
        let set_id = self.index.id_of(selection_set);
        // Scopes for this set come before scopes found while recursing into it.
        let scope_position = self.unresolvable.len();
        let mut resolvable = Vec::new();
        let mut leftover = Vec::new();

        for item in &selection_set.items {
            match item {
                SelectionItem::Field(field) => {
                    match self.split_field(type_name, field, path, set_id) {
                        FieldOutcome::Resolvable(field) => {
                            resolvable.push(SelectionItem::Field(field))
                        }
                        FieldOutcome::Withheld => {}
                        FieldOutcome::Unresolvable => leftover.push(item.clone()),
                    }
                }
                SelectionItem::InlineFragment(fragment) => {
                    // Fragments are invisible in response paths.
                    match self.split(&fragment.type_condition, &fragment.selections, path) {
                        Some(sub) => resolvable.push(SelectionItem::InlineFragment(
                            InlineFragmentSelection {
                                type_condition: fragment.type_condition.clone(),
                                requirement_only: fragment.requirement_only,
                                selections: sub,
                            },
                        )),
                        None => leftover.push(item.clone()),
                    }
                }
            }
        }

        if !leftover.is_empty() {
            let leftover = SelectionSet::of(leftover);
            // The carved-out subset keeps the identity of the set it came
            // from, so the lookup planned for it maps back onto the original.
            self.index.register(selection_set, &leftover);
            self.unresolvable.insert(
                scope_position,
                SelectionSetScope {
                    type_name: type_name.to_string(),
                    path: path.clone(),
                    selections: leftover,
                    selection_set_id: set_id,
                },
            );
        }

        if resolvable.is_empty() {
            return None;
        }

        let result = SelectionSet::of(resolvable);
        self.index.register(selection_set, &result);
        Some(result)
    }

    fn split_field(
        &mut self,
        type_name: &str,
        field: &FieldSelection,
        path: &SelectionPath,
        set_id: SelectionSetId,
    ) -> FieldOutcome {
        // Any schema that resolves the enclosing object can answer __typename.
        if field.is_introspection() {
            return FieldOutcome::Resolvable(field.clone());
        }

        let Some(field_def) = self
            .state
            .type_def(type_name)
            .and_then(|type_def| type_def.field(&field.name))
        else {
            return FieldOutcome::Unresolvable;
        };

        if !field_def.is_resolvable_by(self.schema_name) {
            return FieldOutcome::Unresolvable;
        }

        if let Some(requirements) = field_def.requirements_in(self.schema_name) {
            let withheld = self.split_withheld_field(field, field_def.field_type.named_type(), path);
            self.fields_with_requirements.push(FieldWithRequirement {
                field: withheld,
                declaring_type: type_name.to_string(),
                requirements: requirements.clone(),
                path: path.clone(),
                selection_set_id: set_id,
            });
            return FieldOutcome::Withheld;
        }

        if field.is_leaf() {
            return FieldOutcome::Resolvable(field.clone());
        }

        let field_path = path.push(field.response_key());
        let child_type = field_def.field_type.named_type().to_string();

        match self.split(&child_type, &field.selections, &field_path) {
            Some(sub) => FieldOutcome::Resolvable(FieldSelection {
                selections: sub,
                ..field.clone()
            }),
            // The schema resolves the field but none of the requested children.
            // Fetch __typename so the field still appears in the operation and
            // the lookups below it have an anchor to merge into.
            None => {
                let fallback = SelectionSet::of(vec![SelectionItem::Field(
                    FieldSelection::new_typename(),
                )]);
                self.index.register(&field.selections, &fallback);
                FieldOutcome::Resolvable(FieldSelection {
                    selections: fallback,
                    ..field.clone()
                })
            }
        }
    }

    /// Partitions the children of a field that is withheld for requirements,
    /// so that by the time the field is inlined its sub-selections are already
    /// split for this schema.
    fn split_withheld_field(
        &mut self,
        field: &FieldSelection,
        child_type: &str,
        path: &SelectionPath,
    ) -> FieldSelection {
        if field.is_leaf() {
            return field.clone();
        }

        let field_path = path.push(field.response_key());
        match self.split(child_type, &field.selections, &field_path) {
            Some(sub) => FieldSelection {
                selections: sub,
                ..field.clone()
            },
            None => {
                let fallback = SelectionSet::of(vec![SelectionItem::Field(
                    FieldSelection::new_typename(),
                )]);
                self.index.register(&field.selections, &fallback);
                FieldSelection {
                    selections: fallback,
                    ..field.clone()
                }
            }
        }
    }
}

enum FieldOutcome {
    Resolvable(FieldSelection),
    /// Resolvable, but parked in `fields_with_requirements`.
    Withheld,
    Unresolvable,
}
