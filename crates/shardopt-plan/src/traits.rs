//! Execution seam between plans and the layer that talks to backends.
//!
//! The execution layer implements `Executor` for a single leaf. How a
//! composite is driven (sequential or parallel, fail-fast or collect-all) is
//! that layer's decision; `Plan::execute` below is the simplest driver,
//! sequential and collect-all, and keeps every result attributed to its shard.

use thiserror::Error;

use crate::plan::{LeafPlan, Plan, ShardTarget};

/// Runs one leaf against one physical database.
///
/// Invariants:
/// - Implementations must not assume anything about sibling leaves; each
///   call carries its own target and arguments.
pub trait Executor {
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(&self, leaf: &LeafPlan) -> Result<Self::Output, Self::Error>;
}

/// A leaf-level error tagged with the shard that raised it.
#[derive(Debug, Error)]
#[error("shard {target} failed: {source}")]
pub struct ShardFailure<E>
where
    E: std::error::Error + 'static,
{
    pub target: ShardTarget,
    #[source]
    pub source: E,
}

/// Result of one leaf, together with where it ran.
#[derive(Debug)]
pub struct LeafOutcome<T, E> {
    pub target: ShardTarget,
    pub result: Result<T, E>,
}

impl<T, E> LeafOutcome<T, E>
where
    E: std::error::Error + 'static,
{
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<T, ShardFailure<E>> {
        let target = self.target;
        self.result.map_err(|source| ShardFailure { target, source })
    }
}

impl Plan {
    /// Invoke `executor` once per leaf in plan order.
    ///
    /// Every leaf is attempted; a failure on one shard does not stop the
    /// others. One outcome is returned per leaf.
    pub fn execute<E: Executor>(&self, executor: &E) -> Vec<LeafOutcome<E::Output, E::Error>> {
        self.leaves()
            .into_iter()
            .map(|leaf| LeafOutcome {
                target: leaf.target(),
                result: executor.execute(leaf),
            })
            .collect()
    }

    /// Like `execute`, but collapses the outcomes: all outputs in order, or
    /// every shard failure.
    pub fn execute_all<E: Executor>(
        &self,
        executor: &E,
    ) -> Result<Vec<E::Output>, Vec<ShardFailure<E::Error>>> {
        let mut outputs = Vec::new();
        let mut failures = Vec::new();
        for outcome in self.execute(executor) {
            match outcome.into_result() {
                Ok(v) => outputs.push(v),
                Err(f) => failures.push(f),
            }
        }
        if failures.is_empty() {
            Ok(outputs)
        } else {
            Err(failures)
        }
    }
}
