//! Per-call inputs handed to an optimizer routine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use shardopt_core::ast::Statement;
use shardopt_core::config::OptimizerConfig;
use shardopt_core::error::{Error, Result};
use shardopt_core::rule::ShardingRule;
use shardopt_core::value::BoundArgs;
use shardopt_plan::LeafPlan;

use crate::observe::{Observer, ShardEvent};

/// Advisory cancellation flag shared with the caller's call chain.
///
/// Optimization never blocks, so this is only checked at a couple of
/// cheap points; a set token turns into `Error::Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Everything a routine may read. Nothing in here is mutable.
pub struct OptimizeContext<'a> {
    pub stmt: &'a Arc<Statement>,
    pub rule: &'a dyn ShardingRule,
    pub args: &'a BoundArgs,
    pub config: &'a OptimizerConfig,
    pub observer: &'a dyn Observer,
    pub cancel: Option<&'a CancelToken>,
}

impl<'a> OptimizeContext<'a> {
    pub fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }

    /// Build a leaf for this call's statement and arguments.
    pub fn leaf(&self, database: impl Into<String>, tables: Vec<String>) -> LeafPlan {
        LeafPlan::new(Arc::clone(self.stmt), database, tables, self.args.clone())
    }

    /// Forward a diagnostic event unless diagnostics are switched off.
    pub fn report(&self, event: ShardEvent) {
        if self.config.diagnostics {
            self.observer.shards_computed(&event);
        }
    }
}
