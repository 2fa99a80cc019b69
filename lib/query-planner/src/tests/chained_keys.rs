use std::error::Error;

use crate::tests::testkit::{build_plan, init_logger, operation_node};

#[test]
fn key_lookups_never_loop_back_through_their_consumer() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/chained_keys.graphql",
        r#"
        query {
          products {
            price
          }
        }
        "#,
    )?;

    // The price lookup on "c" is keyed by `sku`, which the root fetch cannot
    // deliver. Schema "c" also resolves `sku`, but fetching it through the
    // price lookup itself would make the lookup wait for its own key. The
    // planner takes the `sku` fetch from "b" instead and the chain stays a
    // line: a, then b, then c.
    assert_eq!(plan.nodes.len(), 3);
    assert_eq!(plan.root_node_ids, vec![1]);

    let root = operation_node(&plan, 1);
    assert_eq!(root.schema_name, "a");
    assert_eq!(
        root.operation.selection_set.to_string(),
        "{products {__typename id @internal}}"
    );
    assert_eq!(root.dependents, vec![3]);

    let sku_fetch = operation_node(&plan, 3);
    assert_eq!(sku_fetch.schema_name, "b");
    assert_eq!(sku_fetch.dependencies, vec![1]);
    assert_eq!(sku_fetch.dependents, vec![2]);
    assert_eq!(
        sku_fetch.operation.selection_set.to_string(),
        "{productById(id: $__requirement_2_id) {sku @internal}}"
    );

    let price_fetch = operation_node(&plan, 2);
    assert_eq!(price_fetch.schema_name, "c");
    assert_eq!(price_fetch.dependencies, vec![3]);
    assert!(price_fetch.dependents.is_empty());
    assert_eq!(
        price_fetch.operation.selection_set.to_string(),
        "{productBySku(sku: $__requirement_1_sku) {price}}"
    );
    assert_eq!(price_fetch.requirements.len(), 1);
    assert_eq!(price_fetch.requirements[0].key, "__requirement_1_sku");
    assert_eq!(price_fetch.requirements[0].path.to_string(), "products");
    assert_eq!(price_fetch.requirements[0].map.to_string(), "sku");

    Ok(())
}
