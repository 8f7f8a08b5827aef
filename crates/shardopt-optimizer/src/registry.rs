//! Statement kind → optimizer routine.
//!
//! Two phases: routines are registered on a `RegistryBuilder` during startup,
//! then `build()` freezes them into a `Registry` that has no mutators and can
//! be shared freely across threads.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;

use shardopt_core::ast::StatementKind;
use shardopt_core::error::{Error, Result};
use shardopt_plan::Plan;

use crate::context::OptimizeContext;
use crate::ddl;

/// A kind-specific optimizer routine.
pub type Routine = fn(&OptimizeContext<'_>) -> Result<Plan>;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::with_defaults);

#[derive(Default)]
pub struct RegistryBuilder {
    routines: BTreeMap<StatementKind, Routine>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `routine` for `kind`. A kind can be registered once.
    pub fn register(mut self, kind: StatementKind, routine: Routine) -> Result<Self> {
        if self.routines.contains_key(&kind) {
            return Err(Error::DuplicateRoutine(kind));
        }
        self.routines.insert(kind, routine);
        Ok(self)
    }

    /// Add the built-in routines for every kind not registered yet.
    pub fn with_builtin(mut self) -> Self {
        for (kind, routine) in ddl::BUILTIN {
            self.routines.entry(*kind).or_insert(*routine);
        }
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            routines: self.routines,
        }
    }
}

/// Frozen dispatch table.
pub struct Registry {
    routines: BTreeMap<StatementKind, Routine>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// All built-in routines.
    pub fn with_defaults() -> Self {
        RegistryBuilder::new().with_builtin().build()
    }

    /// Process-wide default registry, built on first use.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    pub fn dispatch(&self, kind: StatementKind) -> Result<Routine> {
        self.routines
            .get(&kind)
            .copied()
            .ok_or(Error::UnsupportedStatementKind(kind))
    }

    pub fn contains(&self, kind: StatementKind) -> bool {
        self.routines.contains_key(&kind)
    }

    /// Registered kinds, in `StatementKind` order.
    pub fn kinds(&self) -> impl Iterator<Item = StatementKind> + '_ {
        self.routines.keys().copied()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}
