use std::error::Error;
use std::sync::Arc;

use crate::tests::testkit::{build_plan, init_logger, read_planner};
use crate::utils::cancellation::CancellationToken;
use crate::utils::parsing::parse_operation;

const OPERATION: &str = r#"
query {
  products {
    name
    price
  }
}
"#;

#[test]
fn planning_twice_yields_identical_plans() -> Result<(), Box<dyn Error>> {
    init_logger();
    let first = build_plan("fixture/tests/key_dependency.graphql", OPERATION)?;
    let second = build_plan("fixture/tests/key_dependency.graphql", OPERATION)?;

    assert_eq!(
        serde_json::to_string(&*first)?,
        serde_json::to_string(&*second)?
    );

    Ok(())
}

#[test]
fn structurally_equal_operations_share_a_cached_plan() -> Result<(), Box<dyn Error>> {
    init_logger();
    let planner = read_planner("fixture/tests/key_dependency.graphql");
    let cancellation = CancellationToken::new();

    let document = parse_operation(OPERATION);
    let first = planner.plan(&document, None, &cancellation)?;
    let second = planner.plan(&document, None, &cancellation)?;

    assert!(Arc::ptr_eq(&first, &second));

    Ok(())
}

#[test]
fn an_expired_deadline_aborts_planning() {
    init_logger();
    let planner = read_planner("fixture/tests/key_dependency.graphql");
    let cancellation = CancellationToken::with_timeout(std::time::Duration::ZERO);

    let document = parse_operation(OPERATION);
    let result = planner.plan(&document, None, &cancellation);

    assert!(result.is_err());
}
