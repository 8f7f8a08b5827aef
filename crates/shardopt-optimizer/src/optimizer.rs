//! Optimization entry point.

use std::sync::Arc;

use shardopt_core::ast::Statement;
use shardopt_core::config::OptimizerConfig;
use shardopt_core::error::Result;
use shardopt_core::rule::ShardingRule;
use shardopt_core::value::BoundArgs;
use shardopt_plan::Plan;

use crate::context::{CancelToken, OptimizeContext};
use crate::observe::{NoopObserver, Observer};
use crate::registry::Registry;

static NOOP: NoopObserver = NoopObserver;

/// Binds a frozen registry, the active rule set, and configuration.
///
/// Holds only shared references; one optimizer may serve any number of
/// threads at once.
pub struct Optimizer<'a> {
    registry: &'a Registry,
    rule: &'a dyn ShardingRule,
    config: OptimizerConfig,
    observer: &'a dyn Observer,
}

impl<'a> Optimizer<'a> {
    pub fn new(registry: &'a Registry, rule: &'a dyn ShardingRule) -> Self {
        Self {
            registry,
            rule,
            config: OptimizerConfig::default(),
            observer: &NOOP,
        }
    }

    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn Observer) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Plan `stmt` with `args` attached to every leaf.
    pub fn optimize(&self, stmt: &Arc<Statement>, args: &BoundArgs) -> Result<Plan> {
        self.run(stmt, args, None)
    }

    /// As `optimize`, giving up with `Error::Cancelled` once `cancel` is set.
    pub fn optimize_with_cancel(
        &self,
        stmt: &Arc<Statement>,
        args: &BoundArgs,
        cancel: &CancelToken,
    ) -> Result<Plan> {
        self.run(stmt, args, Some(cancel))
    }

    fn run(
        &self,
        stmt: &Arc<Statement>,
        args: &BoundArgs,
        cancel: Option<&CancelToken>,
    ) -> Result<Plan> {
        if let Some(token) = cancel {
            token.check()?;
        }

        let routine = self.registry.dispatch(stmt.kind())?;
        let ctx = OptimizeContext {
            stmt,
            rule: self.rule,
            args,
            config: &self.config,
            observer: self.observer,
            cancel,
        };
        routine(&ctx)
    }
}
