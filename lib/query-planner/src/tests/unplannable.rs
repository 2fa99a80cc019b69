use std::error::Error;

use crate::planner::search::SearchError;
use crate::planner::PlannerError;
use crate::tests::testkit::{build_plan, init_logger, operation_node};

#[test]
fn unreachable_nested_field_fails_planning() {
    init_logger();
    // `secret` only exists on "b", and Product has no lookup into "b", so no
    // combination of steps can deliver it.
    let result = build_plan(
        "fixture/tests/unplannable.graphql",
        r#"
        query {
          products {
            secret
          }
        }
        "#,
    );

    assert!(matches!(
        result,
        Err(PlannerError::Search(SearchError::Unplannable))
    ));
}

#[test]
fn reachable_fields_on_the_same_schema_still_plan() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/unplannable.graphql",
        r#"
        query {
          products {
            id
          }
        }
        "#,
    )?;

    assert_eq!(plan.nodes.len(), 1);
    let root = operation_node(&plan, 1);
    assert_eq!(root.schema_name, "a");
    assert_eq!(
        root.operation.selection_set.to_string(),
        "{products {id}}"
    );

    Ok(())
}
