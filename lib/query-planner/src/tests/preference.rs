use std::error::Error;

use crate::tests::testkit::{build_plan, init_logger, operation_node};

#[test]
fn sibling_fields_prefer_a_shared_lookup() -> Result<(), Box<dyn Error>> {
    init_logger();
    // `rating` is resolvable in both b and c, `weight` only in b. Fetching
    // both through the b lookup needs one round trip less than splitting
    // them, so the search must settle on b alone.
    let plan = build_plan(
        "fixture/tests/preference.graphql",
        r#"
        query {
          products {
            weight
            rating
          }
        }
        "#,
    )?;

    assert_eq!(plan.nodes.len(), 2);

    let first = operation_node(&plan, 1);
    assert_eq!(first.schema_name, "a");
    // Nothing of the product body is resolvable in a, so the root fetch only
    // anchors the objects and carries the lookup key.
    assert_eq!(
        first.operation.selection_set.to_string(),
        "{products {__typename id @internal}}"
    );

    let second = operation_node(&plan, 2);
    assert_eq!(second.schema_name, "b");
    assert_eq!(second.dependencies, vec![1]);
    assert_eq!(
        second.operation.selection_set.to_string(),
        "{productById(id: $__requirement_1_id) {weight rating}}"
    );

    Ok(())
}
