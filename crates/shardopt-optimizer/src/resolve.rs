//! Topology resolution: is this logical table sharded, and onto what?

use shardopt_core::error::Result;
use shardopt_core::rule::{DatabaseTables, ShardingRule, VirtualTable};

/// Look up the virtual table for `table`.
///
/// `Ok(None)` means no rule governs the table (it is unsharded). Rule
/// engine failures are propagated unchanged.
pub fn resolve<'r>(rule: &'r dyn ShardingRule, table: &str) -> Result<Option<&'r VirtualTable>> {
    Ok(rule.virtual_table(table)?)
}

/// Every physical (database, tables) entry realizing `vt`, in topology order.
pub fn enumerate(vt: &VirtualTable) -> DatabaseTables {
    vt.topology().enumerate()
}
