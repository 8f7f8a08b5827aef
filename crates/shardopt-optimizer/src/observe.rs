//! Diagnostic hooks for computed shard sets.
//!
//! Routines describe what they decided (how many shards, whether the table
//! was fully expanded) to an injected `Observer`. Nothing here affects
//! control flow. `TracingObserver` forwards to `tracing` when the feature is
//! enabled and is a no-op otherwise.

use std::sync::Mutex;

use shardopt_core::ast::StatementKind;

/// One shard-set decision for one logical table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardEvent {
    pub kind: StatementKind,
    pub table: String,
    /// Databases targeted.
    pub shards: usize,
    /// Physical tables targeted across those databases.
    pub tables: usize,
    /// True when a sharding rule was found and every shard is targeted.
    pub full_scan: bool,
}

pub trait Observer: Send + Sync {
    fn shards_computed(&self, event: &ShardEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn shards_computed(&self, _event: &ShardEvent) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    #[cfg(feature = "tracing")]
    fn shards_computed(&self, event: &ShardEvent) {
        tracing::debug!(
            kind = %event.kind,
            table = %event.table,
            shards = event.shards,
            tables = event.tables,
            full_scan = event.full_scan,
            "compute shards"
        );
    }

    #[cfg(not(feature = "tracing"))]
    fn shards_computed(&self, _event: &ShardEvent) {}
}

/// Keeps every event; handy in tests and for EXPLAIN-style tooling.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ShardEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ShardEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Observer for RecordingObserver {
    fn shards_computed(&self, event: &ShardEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
