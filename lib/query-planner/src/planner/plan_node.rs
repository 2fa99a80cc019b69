use std::sync::Arc;

use crate::ast::operation::OperationDefinition;
use crate::planner::selection_index::SelectionSetIndex;
use crate::planner::steps::StepList;
use crate::planner::work_item::{Backlog, WorkItem};

/// One candidate plan in the best-first search: the steps committed so far,
/// the work still pending, and the cost accrued on the way here. All heavy
/// state is structurally shared, so cloning a node to branch is cheap.
#[derive(Debug, Clone)]
pub struct PlanNode {
    pub operation: Arc<OperationDefinition>,
    pub steps: StepList,
    pub backlog: Backlog,
    pub index: SelectionSetIndex,
    /// Cost of the schema and lookup choices committed so far.
    pub path_cost: f64,
    /// Optimistic cost of the remaining backlog.
    pub backlog_cost: f64,
    /// Monotonic counter behind requirement variable names. Never reused, so
    /// two requirements in one plan can never collide.
    pub last_requirement_id: u32,
}

impl PlanNode {
    pub fn new(
        operation: Arc<OperationDefinition>,
        index: SelectionSetIndex,
        backlog: Backlog,
    ) -> Self {
        let backlog_cost = backlog_cost(&backlog);
        Self {
            operation,
            steps: StepList::default(),
            backlog,
            index,
            path_cost: 0.0,
            backlog_cost,
            last_requirement_id: 0,
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.path_cost + self.backlog_cost
    }

    /// The successor node after resolving one work item: backlog replaced,
    /// committed state swapped in, and the cost of the choice added.
    pub fn advance(
        &self,
        steps: StepList,
        backlog: Backlog,
        index: SelectionSetIndex,
        added_cost: f64,
    ) -> Self {
        Self {
            operation: self.operation.clone(),
            steps,
            backlog_cost: backlog_cost(&backlog),
            backlog,
            index,
            path_cost: self.path_cost + added_cost,
            last_requirement_id: self.last_requirement_id,
        }
    }

    /// A fresh requirement key, unique within this plan candidate.
    pub fn next_requirement_key(&mut self) -> String {
        self.last_requirement_id += 1;
        format!("__requirement_{}", self.last_requirement_id)
    }
}

/// Every pending item costs at least one schema visit. This keeps candidates
/// that defer work from looking cheaper than candidates that did the work.
fn backlog_cost(backlog: &Backlog) -> f64 {
    backlog.len() as f64
}
