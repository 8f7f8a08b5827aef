//! Schema-defining statements.
//!
//! DDL has no row predicate, so there is nothing to prune by: a sharded
//! table is materialized (or dropped, or truncated) in every physical shard
//! its topology enumerates. An unsharded table goes to the default database
//! under its own name.

pub mod create_table;
pub mod drop_table;
pub mod truncate;

use shardopt_core::ast::StatementKind;
use shardopt_core::error::{Error, Result};
use shardopt_core::rule::DatabaseTables;
use shardopt_plan::{CompositePlan, LeafPlan, Plan};

use crate::context::OptimizeContext;
use crate::observe::ShardEvent;
use crate::registry::Routine;
use crate::resolve::{enumerate, resolve};

pub(crate) const BUILTIN: &[(StatementKind, Routine)] = &[
    (StatementKind::CreateTable, create_table::optimize_create_table),
    (StatementKind::DropTable, drop_table::optimize_drop_table),
    (StatementKind::Truncate, truncate::optimize_truncate),
];

/// Route one logical table: a single leaf when unsharded, otherwise a
/// composite with one leaf per enumerated database.
pub(crate) fn route_table(ctx: &OptimizeContext<'_>, table: &str) -> Result<Plan> {
    let Some(vt) = resolve(ctx.rule, table)? else {
        ctx.report(unsharded_event(ctx, table, 1));
        return Ok(Plan::Leaf(to_single(ctx, vec![table.to_string()])));
    };

    ctx.check_cancelled()?;
    let shards = enumerate(vt);
    ctx.report(full_scan_event(ctx, table, &shards));
    Ok(Plan::Composite(expand(ctx, &shards)))
}

/// Leaf on the configured default database.
pub(crate) fn to_single(ctx: &OptimizeContext<'_>, tables: Vec<String>) -> LeafPlan {
    ctx.leaf(ctx.config.default_database.clone(), tables)
}

/// One leaf per (database, tables) entry, in enumeration order.
pub(crate) fn expand(ctx: &OptimizeContext<'_>, shards: &DatabaseTables) -> CompositePlan {
    shards
        .iter()
        .map(|(db, tables)| ctx.leaf(db, tables.to_vec()))
        .collect()
}

pub(crate) fn full_scan_event(
    ctx: &OptimizeContext<'_>,
    table: &str,
    shards: &DatabaseTables,
) -> ShardEvent {
    ShardEvent {
        kind: ctx.stmt.kind(),
        table: table.to_string(),
        shards: shards.len(),
        tables: shards.table_count(),
        full_scan: true,
    }
}

pub(crate) fn unsharded_event(ctx: &OptimizeContext<'_>, table: &str, tables: usize) -> ShardEvent {
    ShardEvent {
        kind: ctx.stmt.kind(),
        table: table.to_string(),
        shards: 1,
        tables,
        full_scan: false,
    }
}

/// Routine was handed a statement of some other kind.
pub(crate) fn wrong_kind(expected: StatementKind, ctx: &OptimizeContext<'_>) -> Error {
    Error::Invariant(format!(
        "{} routine handed a {} statement",
        expected,
        ctx.stmt.kind()
    ))
}
