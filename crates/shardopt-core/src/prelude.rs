//! Convenient re-exports for downstream crates.

pub use crate::ast::{
    CreateTableStmt, DropTableStmt, SelectStmt, Statement, StatementKind, TableName, TruncateStmt,
};
pub use crate::config::OptimizerConfig;
pub use crate::error::{Error, Result};
pub use crate::hash::Hash256;
pub use crate::rule::{DatabaseTables, Rule, RuleError, ShardingRule, Topology, VirtualTable};
pub use crate::value::{BoundArgs, Value};
