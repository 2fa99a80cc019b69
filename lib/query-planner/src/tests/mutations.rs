use std::error::Error;

use crate::ast::operation::OperationKind;
use crate::tests::testkit::{build_plan, init_logger, operation_node};

#[test]
fn root_mutation_fields_become_independent_steps() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/mutations.graphql",
        r#"
        mutation {
          addProduct(name: "new") {
            id
          }
          publishProduct(id: "1") {
            id
          }
        }
        "#,
    )?;

    assert_eq!(plan.nodes.len(), 2);

    // One root node per mutation field, step ids in document order. The
    // executor runs root nodes in id order, so no dependency edge is needed
    // to keep the fields serial.
    assert_eq!(plan.root_node_ids, vec![1, 2]);

    let first = operation_node(&plan, 1);
    assert_eq!(first.schema_name, "a");
    assert_eq!(first.operation.operation_kind, OperationKind::Mutation);
    assert_eq!(
        first.operation.selection_set.to_string(),
        "{addProduct(name: \"new\") {id}}"
    );
    assert!(first.dependencies.is_empty());
    assert!(first.dependents.is_empty());

    let second = operation_node(&plan, 2);
    assert_eq!(second.schema_name, "b");
    assert_eq!(second.operation.operation_kind, OperationKind::Mutation);
    assert_eq!(
        second.operation.selection_set.to_string(),
        "{publishProduct(id: \"1\") {id}}"
    );
    assert!(second.dependencies.is_empty());
    assert!(second.dependents.is_empty());

    Ok(())
}

#[test]
fn same_schema_mutation_fields_stay_separate_roots() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/mutations.graphql",
        r#"
        mutation {
          addProduct(name: "first") {
            id
          }
          addProduct2: addProduct(name: "second") {
            id
          }
        }
        "#,
    )?;

    // Both fields target schema "a", but they are never merged into one step
    // and no synthetic edge links them.
    assert_eq!(plan.nodes.len(), 2);
    assert_eq!(plan.root_node_ids, vec![1, 2]);

    let first = operation_node(&plan, 1);
    let second = operation_node(&plan, 2);
    assert_eq!(first.schema_name, "a");
    assert_eq!(second.schema_name, "a");
    assert!(first.dependents.is_empty());
    assert!(second.dependencies.is_empty());
    assert_eq!(
        second.operation.selection_set.to_string(),
        "{addProduct2: addProduct(name: \"second\") {id}}"
    );

    Ok(())
}
