use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ast::hash::selection_set_hash;
use crate::ast::operation::OperationDefinition;
use crate::ast::selection_set::SelectionSet;

pub type SelectionSetId = u32;

/// Assigns stable identities to the selection sets of the operation being
/// planned. Identity is structural: when a set is rewritten during planning
/// (subsetting, requirement inlining), the rewritten form is registered under
/// the original id, so every later phase can still ask "which step resolves
/// this part of the operation".
///
/// Snapshots are immutable and cheap to clone; plan candidates branching off
/// a shared ancestor share the underlying map until one of them writes.
#[derive(Debug, Clone, Default)]
pub struct SelectionSetIndex {
    ids_by_hash: Arc<FxHashMap<u64, SelectionSetId>>,
    next_id: SelectionSetId,
}

impl SelectionSetIndex {
    /// Indexes every selection set of a prepared operation, depth-first in
    /// document order. The root selection set always gets id `0`.
    pub fn for_operation(operation: &OperationDefinition) -> Self {
        let mut builder = SelectionSetIndexBuilder::default();
        builder.insert_recursive(&operation.selection_set);
        builder.build()
    }

    pub fn get_id(&self, selection_set: &SelectionSet) -> Option<SelectionSetId> {
        self.ids_by_hash
            .get(&selection_set_hash(selection_set))
            .copied()
    }

    pub fn to_builder(&self) -> SelectionSetIndexBuilder {
        SelectionSetIndexBuilder {
            ids_by_hash: (*self.ids_by_hash).clone(),
            next_id: self.next_id,
        }
    }

    /// Collects the ids of `selection_set` and all of its sub-sets. Every set
    /// is expected to be known; unknown sets are skipped rather than invented
    /// so a stale caller cannot corrupt the index.
    pub fn collect_ids(&self, selection_set: &SelectionSet, out: &mut BTreeSet<SelectionSetId>) {
        if let Some(id) = self.get_id(selection_set) {
            out.insert(id);
        }

        for item in &selection_set.items {
            let sub = item.selection_set();
            if !sub.is_empty() {
                self.collect_ids(sub, out);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct SelectionSetIndexBuilder {
    ids_by_hash: FxHashMap<u64, SelectionSetId>,
    next_id: SelectionSetId,
}

impl SelectionSetIndexBuilder {
    /// Makes `rewritten` share the id of `original`. When `original` was never
    /// indexed it receives a fresh id first, so registration is total.
    pub fn register(&mut self, original: &SelectionSet, rewritten: &SelectionSet) -> SelectionSetId {
        let id = self.id_of(original);
        self.ids_by_hash.insert(selection_set_hash(rewritten), id);
        id
    }

    /// The id of `selection_set`, assigning a fresh one on first sight.
    pub fn id_of(&mut self, selection_set: &SelectionSet) -> SelectionSetId {
        let hash = selection_set_hash(selection_set);
        match self.ids_by_hash.get(&hash) {
            Some(id) => *id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                self.ids_by_hash.insert(hash, id);
                id
            }
        }
    }

    /// Indexes `selection_set` and all of its non-empty sub-sets.
    pub fn insert_recursive(&mut self, selection_set: &SelectionSet) -> SelectionSetId {
        let id = self.id_of(selection_set);

        for item in &selection_set.items {
            let sub = item.selection_set();
            if !sub.is_empty() {
                self.insert_recursive(sub);
            }
        }

        id
    }

    pub fn build(self) -> SelectionSetIndex {
        SelectionSetIndex {
            ids_by_hash: Arc::new(self.ids_by_hash),
            next_id: self.next_id,
        }
    }
}
