use std::path::PathBuf;
use std::sync::{Arc, Once};

use lazy_static::lazy_static;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::planner::plan::{ExecutionNode, ExecutionNodeId, OperationExecutionNode, OperationPlan};
use crate::planner::{Planner, PlannerError};
use crate::utils::cancellation::CancellationToken;
use crate::utils::parsing::parse_operation;

fn init_test_logger_internal() {
    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_bracketed_fields(true)
        .with_deferred_spans(false)
        .with_wraparound(25)
        .with_indent_lines(true)
        .with_timer(tracing_tree::time::Uptime::default())
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_targets(false);

    tracing_subscriber::registry()
        .with(tree_layer)
        .with(EnvFilter::from_default_env())
        .init();
}

lazy_static! {
    static ref TRACING_INIT: Once = Once::new();
}

pub fn init_logger() {
    TRACING_INIT.call_once(init_test_logger_internal);
}

pub fn read_planner(fixture_path: &str) -> Planner {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(fixture_path);
    let sdl = std::fs::read_to_string(path).expect("unable to read fixture file");
    Planner::new_from_sdl(&sdl).expect("fixture schema composes")
}

pub fn build_plan(
    fixture_path: &str,
    operation: &str,
) -> Result<Arc<OperationPlan>, PlannerError> {
    let planner = read_planner(fixture_path);
    let document = parse_operation(operation);
    planner.plan(&document, None, &CancellationToken::new())
}

pub fn operation_node(plan: &OperationPlan, id: ExecutionNodeId) -> &OperationExecutionNode {
    match plan.node_by_id(id) {
        Some(ExecutionNode::Operation(node)) => node,
        _ => panic!("expected an operation node with id {id}"),
    }
}
