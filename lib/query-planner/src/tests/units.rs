use std::collections::{BTreeMap, BTreeSet};

use crate::ast::merge::strip_requirement_selections;
use crate::ast::operation::{OperationDefinition, OperationKind};
use crate::ast::selection_path::SelectionPath;
use crate::ast::selection_set::SelectionSet;
use crate::planner::partition::{partition_selection_set, PartitionInput};
use crate::planner::selection_index::SelectionSetIndex;
use crate::planner::steps::{OperationPlanStep, StepId, StepList};
use crate::planner::work_item::{Backlog, WorkItem};
use crate::state::composite_schema::CompositeSchemaState;
use crate::utils::operation_utils::prepare_operation;
use crate::utils::parsing::{parse_operation, safe_parse_operation, safe_parse_schema};

fn prepared(operation: &str) -> OperationDefinition {
    let document = parse_operation(operation);
    prepare_operation(&document, None).expect("operation prepares")
}

fn two_schema_state() -> CompositeSchemaState {
    let document = safe_parse_schema(
        r#"
        schema
          @source__schema(name: "a", url: "http://a/graphql")
          @source__schema(name: "b", url: "http://b/graphql") {
          query: Query
        }

        type Query @source__type(schema: "a") {
          products: [Product] @source__field(schema: "a")
        }

        type Product
          @source__type(schema: "a")
          @source__type(schema: "b")
          @source__lookup(
            schema: "b"
            field: "productById"
            arguments: [{ name: "id", type: "ID!", map: "id" }]
            key: "id"
          ) {
          id: ID! @source__field(schema: "a") @source__field(schema: "b")
          name: String! @source__field(schema: "a")
          price: Float! @source__field(schema: "b")
        }
        "#,
    )
    .expect("schema parses");
    CompositeSchemaState::try_new(&document).expect("schema composes")
}

#[test]
fn malformed_operations_are_rejected() {
    assert!(safe_parse_operation("{ products { ").is_err());
    assert!(safe_parse_operation("{ products { id } }").is_ok());
}

#[test]
fn schema_metadata_is_exposed_on_the_state() {
    let state = two_schema_state();

    assert!(state.schema_exists("a"));
    assert!(state.schema_exists("b"));
    assert!(!state.schema_exists("c"));

    let product = state.type_def("Product").expect("Product is composite");
    let id = product.field("id").expect("id exists");
    assert!(id.is_resolvable_by("a"));
    assert!(id.is_resolvable_by("b"));
    assert!(product.field("name").expect("name exists").argument_names.is_empty());

    let lookups = product.lookups("b");
    assert_eq!(lookups.len(), 1);
    assert_eq!(lookups[0].field_name, "productById");
}

#[test]
fn stripping_internal_selections_restores_the_client_shape() {
    let operation = prepared("{ products { name id price } }");
    let rewritten = {
        let mut set = operation.selection_set.clone();
        let crate::ast::selection_item::SelectionItem::Field(products) = &mut set.items[0] else {
            panic!("unexpected item kind");
        };
        products.selections.items[1] = products.selections.items[1].with_requirement_only();
        set
    };

    assert_eq!(rewritten.to_string(), "{products {name id @internal price}}");
    assert_eq!(
        strip_requirement_selections(&rewritten).to_string(),
        "{products {name price}}"
    );
}

#[test]
fn backlog_is_persistent() {
    let item = |name: &str| WorkItem::Root {
        type_name: name.to_string(),
        selections: SelectionSet::default(),
        schema_name: None,
    };

    let empty = Backlog::empty();
    let one = empty.push(item("first"));
    let two = one.push(item("second"));

    assert_eq!(two.len(), 2);

    let (popped, rest) = two.pop().expect("non-empty");
    let WorkItem::Root { type_name, .. } = popped else {
        panic!("unexpected item kind");
    };
    assert_eq!(type_name, "second");
    assert_eq!(rest.len(), 1);

    // Popping never affects other holders of the same backlog.
    assert_eq!(two.len(), 2);
    assert_eq!(one.len(), 1);
}

#[test]
fn selection_sets_keep_their_identity_across_rewrites() {
    let operation = prepared("{ products { id name price } }");
    let index = SelectionSetIndex::for_operation(&operation);

    assert_eq!(index.get_id(&operation.selection_set), Some(0));

    let subset = prepared("{ products { id name } }");
    assert_eq!(index.get_id(&subset.selection_set), None);

    let mut builder = index.to_builder();
    builder.register(&operation.selection_set, &subset.selection_set);
    let index = builder.build();

    assert_eq!(index.get_id(&subset.selection_set), Some(0));
    // The original stays known under the same id.
    assert_eq!(index.get_id(&operation.selection_set), Some(0));
}

#[test]
fn registering_the_same_rewrite_twice_is_idempotent() {
    let operation = prepared("{ products { id } }");
    let index = SelectionSetIndex::for_operation(&operation);
    let rewritten = prepared("{ products { id name } }");

    let mut builder = index.to_builder();
    let first = builder.register(&operation.selection_set, &rewritten.selection_set);
    let second = builder.register(&operation.selection_set, &rewritten.selection_set);
    assert_eq!(first, second);
    assert_eq!(first, 0);
}

#[test]
fn partitioning_splits_by_schema_and_keeps_ids() {
    let state = two_schema_state();
    let operation = prepared("{ products { name price } }");
    let index = SelectionSetIndex::for_operation(&operation);

    let partitioned = partition_selection_set(
        &state,
        &index,
        PartitionInput {
            schema_name: "a",
            type_name: "Query",
            selection_set: &operation.selection_set,
            path: SelectionPath::root(),
        },
    );

    let resolvable = partitioned.resolvable.expect("a resolves a part");
    assert_eq!(resolvable.to_string(), "{products {name}}");
    // The rewritten root keeps the root id.
    assert_eq!(partitioned.index.get_id(&resolvable), Some(0));

    assert_eq!(partitioned.unresolvable.len(), 1);
    let scope = &partitioned.unresolvable[0];
    assert_eq!(scope.type_name, "Product");
    assert_eq!(scope.path.to_string(), "products");
    assert_eq!(scope.selections.to_string(), "{price}");
    assert_eq!(
        partitioned.index.get_id(&scope.selections),
        Some(scope.selection_set_id)
    );

    assert!(partitioned.fields_with_requirements.is_empty());
}

#[test]
fn partitioning_for_an_uninvolved_schema_resolves_nothing() {
    let state = two_schema_state();
    let operation = prepared("{ products { name } }");
    let index = SelectionSetIndex::for_operation(&operation);

    let partitioned = partition_selection_set(
        &state,
        &index,
        PartitionInput {
            schema_name: "b",
            type_name: "Query",
            selection_set: &operation.selection_set,
            path: SelectionPath::root(),
        },
    );

    assert!(partitioned.resolvable.is_none());
    assert_eq!(partitioned.unresolvable.len(), 1);
    assert_eq!(partitioned.unresolvable[0].selections.to_string(), "{products {name}}");
}

fn bare_step(id: StepId, dependents: &[StepId]) -> OperationPlanStep {
    OperationPlanStep {
        id,
        schema_name: "a".to_string(),
        type_name: "Query".to_string(),
        definition: OperationDefinition {
            name: None,
            operation_kind: OperationKind::Query,
            variable_definitions: Vec::new(),
            selection_set: SelectionSet::default(),
        },
        root_selection_set_id: 0,
        selection_sets: BTreeSet::new(),
        target: SelectionPath::root(),
        source: SelectionPath::root(),
        dependents: dependents.iter().copied().collect(),
        requirements: BTreeMap::new(),
    }
}

#[test]
fn transitive_dependency_checks_follow_dependents() {
    let steps = StepList::default()
        .add(bare_step(1, &[2]))
        .add(bare_step(2, &[3]))
        .add(bare_step(3, &[]));

    // 3 consumes 2 which consumes 1.
    assert!(steps.is_dependent_of(3, 1));
    assert!(steps.is_dependent_of(2, 1));
    assert!(!steps.is_dependent_of(1, 3));
    assert!(!steps.is_dependent_of(2, 3));
}
