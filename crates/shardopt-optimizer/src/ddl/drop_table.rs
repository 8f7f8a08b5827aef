//! DROP TABLE: may name several logical tables at once.
//!
//! A single table routes exactly like CREATE TABLE. With several tables,
//! every unsharded name is gathered into one leaf on the default database
//! (placed where the first unsharded name appears) and every sharded name
//! contributes one leaf per database; the result is one flat composite in
//! statement order. Names repeated in the statement are planned once.
//!
//! Routing keys on the last name segment only, so `s1.t` and `s2.t` are the
//! same logical table and unsharded leaves carry the bare name.

use shardopt_core::ast::StatementKind;
use shardopt_core::error::{Error, Result};
use shardopt_plan::{CompositePlan, Plan};

use super::{expand, full_scan_event, route_table, to_single, unsharded_event, wrong_kind};
use crate::context::OptimizeContext;
use crate::resolve::{enumerate, resolve};

pub fn optimize_drop_table(ctx: &OptimizeContext<'_>) -> Result<Plan> {
    let stmt = ctx
        .stmt
        .as_drop_table()
        .ok_or_else(|| wrong_kind(StatementKind::DropTable, ctx))?;

    let mut names: Vec<&str> = Vec::with_capacity(stmt.tables.len());
    for t in &stmt.tables {
        if !names.contains(&t.suffix()) {
            names.push(t.suffix());
        }
    }

    match names.as_slice() {
        [] => Err(Error::Invariant("DROP TABLE without tables".into())),
        [single] => route_table(ctx, single),
        _ => drop_many(ctx, &names),
    }
}

fn drop_many(ctx: &OptimizeContext<'_>, names: &[&str]) -> Result<Plan> {
    let mut plans: Vec<Plan> = Vec::new();
    let mut unsharded: Vec<String> = Vec::new();
    let mut default_slot: Option<usize> = None;

    for &name in names {
        match resolve(ctx.rule, name)? {
            None => {
                default_slot.get_or_insert(plans.len());
                unsharded.push(name.to_string());
            }
            Some(vt) => {
                ctx.check_cancelled()?;
                let shards = enumerate(vt);
                ctx.report(full_scan_event(ctx, name, &shards));
                plans.extend(expand(ctx, &shards).into_plans());
            }
        }
    }

    if let Some(slot) = default_slot {
        ctx.report(unsharded_event(ctx, &unsharded.join(","), unsharded.len()));
        plans.insert(slot, Plan::Leaf(to_single(ctx, unsharded)));
    }

    Ok(Plan::Composite(CompositePlan::new(plans)))
}
