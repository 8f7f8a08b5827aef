//! TRUNCATE TABLE: every physical table realizing the logical one is emptied.

use shardopt_core::ast::StatementKind;
use shardopt_core::error::Result;
use shardopt_plan::Plan;

use super::{route_table, wrong_kind};
use crate::context::OptimizeContext;

pub fn optimize_truncate(ctx: &OptimizeContext<'_>) -> Result<Plan> {
    let stmt = ctx
        .stmt
        .as_truncate()
        .ok_or_else(|| wrong_kind(StatementKind::Truncate, ctx))?;

    route_table(ctx, stmt.table.suffix())
}
