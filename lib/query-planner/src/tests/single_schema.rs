use std::error::Error;

use crate::ast::operation::OperationKind;
use crate::tests::testkit::{build_plan, init_logger, operation_node};

#[test]
fn everything_from_one_schema_is_one_node() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/single_schema.graphql",
        r#"
        query {
          products {
            id
            name
            price
          }
        }
        "#,
    )?;

    assert_eq!(plan.nodes.len(), 1);
    assert_eq!(plan.root_node_ids, vec![1]);

    let node = operation_node(&plan, 1);
    assert_eq!(node.schema_name, "a");
    assert!(node.dependencies.is_empty());
    assert!(node.dependents.is_empty());
    assert!(node.requirements.is_empty());
    assert!(node.source.is_root());
    assert!(node.target.is_root());
    assert_eq!(
        node.operation.selection_set.to_string(),
        "{products {id name price}}"
    );

    Ok(())
}

#[test]
fn client_variables_are_forwarded() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/single_schema.graphql",
        r#"
        query ProductName($id: ID!) {
          product(id: $id) {
            name
          }
        }
        "#,
    )?;

    let node = operation_node(&plan, 1);
    assert_eq!(node.operation.operation_kind, OperationKind::Query);
    assert_eq!(node.operation.variable_definitions.len(), 1);
    assert_eq!(node.operation.variable_definitions[0].name, "id");
    assert_eq!(
        node.operation.variable_definitions[0].variable_type.to_string(),
        "ID!"
    );
    assert!(node.operation_name.starts_with("ProductName_"));
    assert!(node.operation_name.ends_with("_1"));
    assert_eq!(
        node.operation.selection_set.to_string(),
        "{product(id: $id) {name}}"
    );

    Ok(())
}
