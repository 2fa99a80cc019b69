pub mod ast;
pub mod planner;
pub mod state;
pub mod utils;

pub use planner::plan::{ExecutionNode, OperationPlan};
pub use planner::{Planner, PlannerError};

#[cfg(test)]
mod tests;
