use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use crate::ast::operation::OperationDefinition;
use crate::ast::selection_path::SelectionPath;
use crate::planner::plan::OperationRequirement;
use crate::planner::selection_index::SelectionSetId;

pub type StepId = u32;

/// One planned source schema operation, still mutable while the search runs.
/// Steps are immutable values; updating one replaces it in the owning
/// `StepList`, leaving sibling plan candidates untouched.
#[derive(Debug, Clone)]
pub struct OperationPlanStep {
    pub id: StepId,
    pub schema_name: String,
    /// The composite type the operation's effective selection set applies to.
    pub type_name: String,
    pub definition: OperationDefinition,
    pub root_selection_set_id: SelectionSetId,
    /// Ids of every original selection set this step resolves a part of.
    pub selection_sets: BTreeSet<SelectionSetId>,
    /// Where the step's data merges into the client response.
    pub target: SelectionPath,
    /// Where inside the step's own response the data lives.
    pub source: SelectionPath,
    /// Steps that consume data produced by this step.
    pub dependents: BTreeSet<StepId>,
    /// Requirement variables of this step's operation, keyed by variable name.
    pub requirements: BTreeMap<String, OperationRequirement>,
}

impl OperationPlanStep {
    pub fn resolves(&self, selection_set_id: SelectionSetId) -> bool {
        self.selection_sets.contains(&selection_set_id)
    }
}

/// Persistent list of plan steps. Cloning is shallow, so plan candidates can
/// branch freely; `set` copies the spine and swaps a single entry.
#[derive(Debug, Clone, Default)]
pub struct StepList {
    steps: Vec<Arc<OperationPlanStep>>,
    next_id: StepId,
}

impl StepList {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<OperationPlanStep>> {
        self.steps.iter()
    }

    /// The id the next added step will receive. Ids start at 1 and increase in
    /// creation order, which also fixes the execution order of sibling
    /// mutation steps.
    pub fn next_id(&self) -> StepId {
        self.next_id + 1
    }

    pub fn add(&self, step: OperationPlanStep) -> StepList {
        debug_assert_eq!(step.id, self.next_id());

        let mut steps = self.steps.clone();
        steps.push(Arc::new(step));

        StepList {
            steps,
            next_id: self.next_id + 1,
        }
    }

    pub fn by_id(&self, id: StepId) -> Option<&Arc<OperationPlanStep>> {
        self.steps.iter().find(|step| step.id == id)
    }

    /// Replaces the step with `step.id`, returning the updated list.
    pub fn set(&self, step: OperationPlanStep) -> StepList {
        let mut steps = self.steps.clone();
        if let Some(slot) = steps.iter_mut().find(|slot| slot.id == step.id) {
            *slot = Arc::new(step);
        }

        StepList {
            steps,
            next_id: self.next_id,
        }
    }

    /// Whether `step_id` transitively consumes data of `from`. Used to reject
    /// requirement providers that would close a dependency cycle.
    pub fn is_dependent_of(&self, step_id: StepId, from: StepId) -> bool {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == step_id {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(step) = self.by_id(current) {
                queue.extend(step.dependents.iter().copied());
            }
        }

        false
    }
}
