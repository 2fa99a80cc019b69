use std::sync::Arc;

use crate::ast::selection_path::SelectionPath;
use crate::ast::selection_set::{FieldSelection, SelectionSet};
use crate::planner::selection_index::SelectionSetId;
use crate::planner::steps::StepId;
use crate::state::metadata::{FieldRequirements, Lookup};

/// A unit of pending planning work. Work items are cheap to clone because the
/// backlog they live in is shared across many plan candidates.
#[derive(Debug, Clone)]
pub enum WorkItem {
    /// Resolve a selection set of a root operation type. The schema choice is
    /// left open until the item is enqueued and branched.
    Root {
        type_name: String,
        selections: SelectionSet,
        schema_name: Option<String>,
    },
    /// Re-enter a type through a lookup to resolve selections the previous
    /// schema could not. The concrete lookup is chosen at enqueue time.
    Lookup {
        type_name: String,
        path: SelectionPath,
        selections: SelectionSet,
        selection_set_id: SelectionSetId,
        lookup: Option<Arc<Lookup>>,
        /// A step that must wait for this lookup's data, when the lookup was
        /// spawned to satisfy a field requirement.
        dependent: Option<StepId>,
    },
    /// Bind the argument requirements of a field that was withheld from its
    /// step, then inline the field into that step.
    FieldRequirement {
        step_id: StepId,
        field: FieldSelection,
        declaring_type: String,
        requirements: Arc<FieldRequirements>,
        path: SelectionPath,
        selection_set_id: SelectionSetId,
    },
}

/// Persistent LIFO backlog. Pushing and popping never mutate shared state, a
/// popped backlog is simply a view one node further down the same spine.
#[derive(Debug, Clone, Default)]
pub struct Backlog {
    head: Option<Arc<BacklogNode>>,
    len: usize,
}

#[derive(Debug)]
struct BacklogNode {
    item: WorkItem,
    next: Option<Arc<BacklogNode>>,
}

impl Backlog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&self, item: WorkItem) -> Self {
        Self {
            head: Some(Arc::new(BacklogNode {
                item,
                next: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn peek(&self) -> Option<&WorkItem> {
        self.head.as_ref().map(|node| &node.item)
    }

    pub fn pop(&self) -> Option<(WorkItem, Backlog)> {
        self.head.as_ref().map(|node| {
            (
                node.item.clone(),
                Backlog {
                    head: node.next.clone(),
                    len: self.len - 1,
                },
            )
        })
    }
}
