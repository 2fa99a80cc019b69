use std::error::Error;

use crate::planner::plan::ExecutionNode;
use crate::tests::testkit::{build_plan, init_logger, operation_node};

#[test]
fn key_fields_are_gathered_from_multiple_steps() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/compound_key.graphql",
        r#"
        query {
          products {
            price
          }
        }
        "#,
    )?;

    // The price lookup needs `id sku`: `id` lives on the root fetch against
    // "a", `sku` only exists on "b". Each provider contributes its part, and
    // only the part no step delivers becomes a new lookup.
    assert_eq!(plan.nodes.len(), 3);
    assert_eq!(plan.root_node_ids, vec![1]);

    let root = operation_node(&plan, 1);
    assert_eq!(root.schema_name, "a");
    assert_eq!(
        root.operation.selection_set.to_string(),
        "{products {__typename id @internal}}"
    );
    assert_eq!(root.dependents, vec![2, 3]);

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
    assert_eq!(price_fetch.dependencies, vec![1, 3]);
    assert_eq!(
        price_fetch.operation.selection_set.to_string(),
        "{productBySku(id: $__requirement_1_id, sku: $__requirement_1_sku) {price}}"
    );

    assert_eq!(price_fetch.requirements.len(), 2);
    assert_eq!(price_fetch.requirements[0].key, "__requirement_1_id");
    assert_eq!(price_fetch.requirements[0].map.to_string(), "id");
    assert_eq!(price_fetch.requirements[1].key, "__requirement_1_sku");
    assert_eq!(price_fetch.requirements[1].map.to_string(), "sku");

    Ok(())
}

#[test]
fn dependencies_always_precede_their_dependents() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        "fixture/tests/compound_key.graphql",
        r#"
        query {
          products {
            sku
            price
          }
        }
        "#,
    )?;

    // The node list is a valid execution order: every dependency of a node
    // shows up earlier in the list, so the edges cannot form a cycle.
    let position_of = |id| {
        plan.nodes
            .iter()
            .position(|node| node.id() == id)
            .expect("dependency id refers to a node in the plan")
    };

    for (position, node) in plan.nodes.iter().enumerate() {
        let ExecutionNode::Operation(node) = node else {
            continue;
        };
        for dependency in &node.dependencies {
            assert!(
                position_of(*dependency) < position,
                "node {} runs before its dependency {}",
                node.id,
                dependency
            );
        }
    }

    Ok(())
}
