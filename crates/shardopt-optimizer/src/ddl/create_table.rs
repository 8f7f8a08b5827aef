//! CREATE TABLE: the table must exist identically in every shard that later
//! sharding-key routing may land on.

use shardopt_core::ast::StatementKind;
use shardopt_core::error::Result;
use shardopt_plan::Plan;

use super::{route_table, wrong_kind};
use crate::context::OptimizeContext;

pub fn optimize_create_table(ctx: &OptimizeContext<'_>) -> Result<Plan> {
    let stmt = ctx
        .stmt
        .as_create_table()
        .ok_or_else(|| wrong_kind(StatementKind::CreateTable, ctx))?;

    route_table(ctx, stmt.table.suffix())
}
