use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::ast::operation::{OperationDefinition, OperationKind};
use crate::ast::selection_item::SelectionItem;
use crate::ast::selection_set::SelectionSet;
use crate::planner::execution_tree::{build_execution_tree, ExecutionTreeError};
use crate::planner::plan::{ExecutionNode, IntrospectionExecutionNode, OperationPlan};
use crate::planner::search::{plan_search, SearchError};
use crate::state::composite_schema::CompositeSchemaState;
use crate::state::composition_error::CompositionError;
use crate::utils::cancellation::CancellationToken;
use crate::utils::operation_utils::{prepare_operation, OperationPrepareError};
use crate::utils::parsing::{safe_parse_schema, QueryDocument};

pub mod execution_tree;
pub mod inline;
pub mod partition;
pub mod plan;
pub mod plan_node;
pub mod search;
pub mod selection_index;
pub mod steps;
pub mod work_item;

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error(transparent)]
    Composition(#[from] CompositionError),
    #[error("failed to parse the composite schema document: {0}")]
    SchemaParse(#[from] graphql_parser::schema::ParseError),
    #[error(transparent)]
    Prepare(#[from] OperationPrepareError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    ExecutionTree(#[from] ExecutionTreeError),
}

/// Plans already handed out stay valid while consumers hold them, eviction
/// only drops the cache's own reference.
const PLAN_CACHE_SIZE: usize = 256;

/// Turns client operations against the composite schema into execution plans.
/// One instance per composite schema version; planning is read-only over the
/// schema state, so a `Planner` can be shared across request handlers.
pub struct Planner {
    state: CompositeSchemaState,
    cache: Mutex<LruCache<u64, Arc<OperationPlan>>>,
}

impl Planner {
    pub fn new(state: CompositeSchemaState) -> Self {
        Self {
            state,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(PLAN_CACHE_SIZE).expect("cache size is non-zero"),
            )),
        }
    }

    pub fn new_from_sdl(sdl: &str) -> Result<Self, PlannerError> {
        let document = safe_parse_schema(sdl)?;
        let state = CompositeSchemaState::try_new(&document)?;
        Ok(Self::new(state))
    }

    pub fn state(&self) -> &CompositeSchemaState {
        &self.state
    }

    /// Plans the selected operation of a parsed document. Structurally
    /// identical operations share a cached plan.
    #[instrument(level = "debug", skip_all, fields(operation_name))]
    pub fn plan(
        &self,
        document: &QueryDocument,
        operation_name: Option<&str>,
        cancellation: &CancellationToken,
    ) -> Result<Arc<OperationPlan>, PlannerError> {
        let operation = prepare_operation(document, operation_name)?;
        let hash = operation.hash();

        if let Some(plan) = self.cache.lock().get(&hash) {
            debug!(hash, "plan cache hit");
            return Ok(plan.clone());
        }

        let plan = Arc::new(self.plan_operation(operation, hash, cancellation)?);
        self.cache.lock().put(hash, plan.clone());

        Ok(plan)
    }

    fn plan_operation(
        &self,
        operation: OperationDefinition,
        hash: u64,
        cancellation: &CancellationToken,
    ) -> Result<OperationPlan, PlannerError> {
        let short_hash = format!("{:016x}", hash);
        let short_hash = &short_hash[..8];

        let (stripped, introspection) = split_root_introspection(&operation);

        if stripped.selection_set.is_empty() {
            let Some(selections) = introspection else {
                return Err(SearchError::Unplannable.into());
            };
            return Ok(introspection_only_plan(&operation, selections));
        }

        let winner = plan_search(&self.state, Arc::new(stripped), cancellation)?;
        let plan = build_execution_tree(&operation, short_hash, &winner.steps, introspection)?;

        Ok(plan)
    }
}

/// Separates root-level introspection fields from the selections that need
/// source schemas. Introspection is answered from the composite schema itself
/// and never reaches any source schema.
fn split_root_introspection(
    operation: &OperationDefinition,
) -> (OperationDefinition, Option<SelectionSet>) {
    if operation.operation_kind != OperationKind::Query {
        return (operation.clone(), None);
    }

    let mut introspection = Vec::new();
    let mut rest = Vec::new();

    for item in &operation.selection_set.items {
        match item {
            SelectionItem::Field(field) if field.is_introspection() => {
                introspection.push(item.clone())
            }
            _ => rest.push(item.clone()),
        }
    }

    if introspection.is_empty() {
        return (operation.clone(), None);
    }

    let stripped = OperationDefinition {
        selection_set: SelectionSet::of(rest),
        ..operation.clone()
    };

    (stripped, Some(SelectionSet::of(introspection)))
}

fn introspection_only_plan(
    operation: &OperationDefinition,
    selections: SelectionSet,
) -> OperationPlan {
    OperationPlan {
        operation_name: operation.name.clone(),
        operation: operation.clone(),
        root_node_ids: vec![1],
        nodes: vec![ExecutionNode::Introspection(IntrospectionExecutionNode {
            id: 1,
            selections,
        })],
    }
}
