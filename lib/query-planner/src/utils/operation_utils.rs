use std::collections::HashMap;

use graphql_parser::query as parser;

use crate::ast::operation::{OperationDefinition, OperationKind, VariableDefinition};
use crate::ast::selection_item::SelectionItem;
use crate::ast::selection_set::{FieldSelection, InlineFragmentSelection, SelectionSet};
use crate::utils::parsing::QueryDocument;

#[derive(Debug, Clone, thiserror::Error)]
pub enum OperationPrepareError {
    #[error("failed to locate operation to execute")]
    MissingOperation,
    #[error("operation '{0}' was not found in the document")]
    OperationNotFound(String),
    #[error("fragment '{0}' is not defined")]
    UnknownFragment(String),
    #[error("fragment '{0}' spreads itself recursively")]
    RecursiveFragment(String),
}

type Fragments<'a> = HashMap<String, &'a parser::FragmentDefinition<'static, String>>;

/// Selects the operation to plan from a parsed document and converts it into
/// the planner-owned AST. Fragment spreads are inlined in the process, so the
/// planner only ever deals with fields and inline fragments.
pub fn prepare_operation(
    document: &QueryDocument,
    operation_name: Option<&str>,
) -> Result<OperationDefinition, OperationPrepareError> {
    let mut fragments: Fragments<'_> = HashMap::new();
    let mut operations = Vec::new();

    for definition in &document.definitions {
        match definition {
            parser::Definition::Fragment(fragment) => {
                fragments.insert(fragment.name.clone(), fragment);
            }
            parser::Definition::Operation(operation) => operations.push(operation),
        }
    }

    let operation = match operation_name {
        Some(name) => operations
            .into_iter()
            .find(|op| operation_def_name(op) == Some(name))
            .ok_or_else(|| OperationPrepareError::OperationNotFound(name.to_string()))?,
        None => operations
            .into_iter()
            .next()
            .ok_or(OperationPrepareError::MissingOperation)?,
    };

    convert_operation(operation, &fragments)
}

fn operation_def_name<'a>(operation: &'a parser::OperationDefinition<'static, String>) -> Option<&'a str> {
    match operation {
        parser::OperationDefinition::Query(query) => query.name.as_deref(),
        parser::OperationDefinition::Mutation(mutation) => mutation.name.as_deref(),
        parser::OperationDefinition::Subscription(subscription) => subscription.name.as_deref(),
        parser::OperationDefinition::SelectionSet(_) => None,
    }
}

fn convert_operation(
    operation: &parser::OperationDefinition<'static, String>,
    fragments: &Fragments<'_>,
) -> Result<OperationDefinition, OperationPrepareError> {
    let (name, kind, variable_definitions, selection_set) = match operation {
        parser::OperationDefinition::Query(query) => (
            query.name.clone(),
            OperationKind::Query,
            &query.variable_definitions,
            &query.selection_set,
        ),
        parser::OperationDefinition::Mutation(mutation) => (
            mutation.name.clone(),
            OperationKind::Mutation,
            &mutation.variable_definitions,
            &mutation.selection_set,
        ),
        parser::OperationDefinition::Subscription(subscription) => (
            subscription.name.clone(),
            OperationKind::Subscription,
            &subscription.variable_definitions,
            &subscription.selection_set,
        ),
        parser::OperationDefinition::SelectionSet(selection_set) => {
            let selection_set = convert_selection_set(selection_set, fragments, &mut Vec::new())?;
            return Ok(OperationDefinition {
                name: None,
                operation_kind: OperationKind::Query,
                variable_definitions: Vec::new(),
                selection_set,
            });
        }
    };

    Ok(OperationDefinition {
        name,
        operation_kind: kind,
        variable_definitions: variable_definitions.iter().map(convert_variable).collect(),
        selection_set: convert_selection_set(selection_set, fragments, &mut Vec::new())?,
    })
}

fn convert_variable(variable: &parser::VariableDefinition<'static, String>) -> VariableDefinition {
    VariableDefinition {
        name: variable.name.clone(),
        variable_type: (&variable.var_type).into(),
        default_value: variable.default_value.as_ref().map(|v| v.into()),
    }
}

fn convert_selection_set(
    selection_set: &parser::SelectionSet<'static, String>,
    fragments: &Fragments<'_>,
    spread_stack: &mut Vec<String>,
) -> Result<SelectionSet, OperationPrepareError> {
    let mut items = Vec::with_capacity(selection_set.items.len());

    for selection in &selection_set.items {
        match selection {
            parser::Selection::Field(field) => {
                items.push(SelectionItem::Field(FieldSelection {
                    alias: field.alias.clone(),
                    name: field.name.clone(),
                    arguments: field
                        .arguments
                        .iter()
                        .map(|(name, value)| (name.clone(), value.into()))
                        .collect(),
                    requirement_only: false,
                    selections: convert_selection_set(&field.selection_set, fragments, spread_stack)?,
                }));
            }
            parser::Selection::InlineFragment(fragment) => {
                let converted =
                    convert_selection_set(&fragment.selection_set, fragments, spread_stack)?;
                match &fragment.type_condition {
                    Some(parser::TypeCondition::On(type_name)) => {
                        items.push(SelectionItem::InlineFragment(InlineFragmentSelection {
                            type_condition: type_name.clone(),
                            requirement_only: false,
                            selections: converted,
                        }));
                    }
                    // A conditionless inline fragment does not narrow the type,
                    // its selections can be lifted into the parent set.
                    None => items.extend(converted.items),
                }
            }
            parser::Selection::FragmentSpread(spread) => {
                if spread_stack.contains(&spread.fragment_name) {
                    return Err(OperationPrepareError::RecursiveFragment(
                        spread.fragment_name.clone(),
                    ));
                }

                let fragment = fragments.get(&spread.fragment_name).ok_or_else(|| {
                    OperationPrepareError::UnknownFragment(spread.fragment_name.clone())
                })?;

                spread_stack.push(spread.fragment_name.clone());
                let converted =
                    convert_selection_set(&fragment.selection_set, fragments, spread_stack)?;
                spread_stack.pop();

                let parser::TypeCondition::On(type_name) = &fragment.type_condition;
                items.push(SelectionItem::InlineFragment(InlineFragmentSelection {
                    type_condition: type_name.clone(),
                    requirement_only: false,
                    selections: converted,
                }));
            }
        }
    }

    Ok(SelectionSet { items })
}

/// Converts a raw selection set body, e.g. the `key` argument of a lookup
/// directive, into the planner AST. Fragment spreads are not allowed here.
pub fn convert_selection_set_body(
    selection_set: &parser::SelectionSet<'static, String>,
) -> Result<SelectionSet, OperationPrepareError> {
    convert_selection_set(selection_set, &HashMap::new(), &mut Vec::new())
}
