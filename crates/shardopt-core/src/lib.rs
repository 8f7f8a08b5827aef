#![forbid(unsafe_code)]
//! shardopt-core: shared vocabulary for the statement-routing optimizer.
//!
//! Responsibilities:
//! - The typed statement AST a parser hands to the optimizer (`ast`).
//! - Bound parameter values (`value`).
//! - Sharding rules, virtual tables, and physical topologies (`rule`).
//! - Optimizer configuration, stable hashing, and the canonical error type.
//!
//! **No I/O, no execution** here. Planning lives in `shardopt-optimizer`,
//! plan trees in `shardopt-plan`.

pub mod ast;
pub mod config;
pub mod error;
pub mod hash;
pub mod prelude;
pub mod rule;
pub mod value;

/// Crate version, stamped into diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
