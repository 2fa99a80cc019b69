use std::error::Error;

use crate::tests::testkit::{build_plan, init_logger, operation_node};

#[test]
fn cross_schema_field_resolved_through_lookup() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/key_dependency.graphql",
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

    assert_eq!(plan.nodes.len(), 2);
    assert_eq!(plan.root_node_ids, vec![1]);

    let first = operation_node(&plan, 1);
    assert_eq!(first.schema_name, "a");
    assert_eq!(first.dependents, vec![2]);
    // The key field was already requested by the client, so nothing extra is
    // fetched for the lookup.
    assert_eq!(
        first.operation.selection_set.to_string(),
        "{products {id name}}"
    );

    let second = operation_node(&plan, 2);
    assert_eq!(second.schema_name, "b");
    assert_eq!(second.dependencies, vec![1]);
    assert_eq!(second.target.to_string(), "products");
    assert_eq!(second.source.to_string(), "productById");
    assert_eq!(
        second.operation.selection_set.to_string(),
        "{productById(id: $__requirement_1_id) {price}}"
    );

    assert_eq!(second.requirements.len(), 1);
    let requirement = &second.requirements[0];
    assert_eq!(requirement.key, "__requirement_1_id");
    assert_eq!(requirement.variable_type.to_string(), "ID!");
    assert_eq!(requirement.path.to_string(), "products");
    assert_eq!(requirement.map.to_string(), "id");

    assert_eq!(second.operation.variable_definitions.len(), 1);
    assert_eq!(
        second.operation.variable_definitions[0].name,
        "__requirement_1_id"
    );

    Ok(())
}

#[test]
fn pretty_printed_plan() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/key_dependency.graphql",
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

    insta::with_settings!({filters => vec![(r"anonymous_[0-9a-f]{8}_", "anonymous_[hash]_")]}, {
        insta::assert_snapshot!(plan.to_string(), @r"
        plan {
          node 1 on a {
            query anonymous_[hash]_1 {products {id name}}
          }
          node 2 on b at products after [1] {
            requires $__requirement_1_id: ID! from products via id
            query anonymous_[hash]_2($__requirement_1_id: ID!) {productById(id: $__requirement_1_id) {price}}
          }
        }
        ");
    });

    Ok(())
}

#[test]
fn key_field_is_added_as_internal_when_not_requested() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/key_dependency.graphql",
        r#"
        query {
          products {
            name
            price
          }
        }
        "#,
    )?;

    assert_eq!(plan.nodes.len(), 2);

    let first = operation_node(&plan, 1);
    assert_eq!(
        first.operation.selection_set.to_string(),
        "{products {name id @internal}}"
    );

    let second = operation_node(&plan, 2);
    assert_eq!(
        second.operation.selection_set.to_string(),
        "{productById(id: $__requirement_1_id) {price}}"
    );

    Ok(())
}
