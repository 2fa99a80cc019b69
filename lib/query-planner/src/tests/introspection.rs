use std::error::Error;

use crate::planner::plan::ExecutionNode;
use crate::tests::testkit::{build_plan, init_logger, operation_node};

#[test]
fn introspection_only_operation_skips_source_schemas() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/single_schema.graphql",
        r#"
        query {
          __schema {
            queryType {
              name
            }
          }
        }
        "#,
    )?;

    assert_eq!(plan.nodes.len(), 1);
    assert_eq!(plan.root_node_ids, vec![1]);

    let Some(ExecutionNode::Introspection(node)) = plan.node_by_id(1) else {
        panic!("expected an introspection node");
    };
    assert_eq!(
        node.selections.to_string(),
        "{__schema {queryType {name}}}"
    );

    Ok(())
}

#[test]
fn mixed_operation_gets_an_extra_introspection_root() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/single_schema.graphql",
        r#"
        query {
          __typename
          products {
            id
          }
        }
        "#,
    )?;

    assert_eq!(plan.nodes.len(), 2);
    assert_eq!(plan.root_node_ids, vec![1, 2]);

    let fetch = operation_node(&plan, 1);
    assert_eq!(fetch.schema_name, "a");
    assert_eq!(fetch.operation.selection_set.to_string(), "{products {id}}");

    let Some(ExecutionNode::Introspection(introspection)) = plan.node_by_id(2) else {
        panic!("expected an introspection node");
    };
    assert_eq!(introspection.selections.to_string(), "{__typename}");

    Ok(())
}
