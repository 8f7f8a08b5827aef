#![forbid(unsafe_code)]
//! shardopt-optimizer: parsed statement + sharding rule + bound arguments
//! → executable `Plan`.
//!
//! Design:
//! - A `Registry` maps each `StatementKind` to the routine that plans it.
//!   It is built once (`RegistryBuilder`) and read-only afterwards.
//! - Routines consult the topology resolver (`resolve`) to learn whether a
//!   table is sharded, then build leaves and composites (`shardopt-plan`).
//! - DDL routines (`ddl`) use full expansion: a sharded table is touched in
//!   every physical shard, since there is no predicate to prune by.
//! - Diagnostics go to an injected `Observer`, never a global logger.
//!
//! NOTE: No I/O here. Optimization is synchronous and side-effect free.

pub mod context;
pub mod ddl;
pub mod dsl;
pub mod observe;
pub mod optimizer;
pub mod registry;
pub mod resolve;

pub use context::{CancelToken, OptimizeContext};
pub use dsl::yaml::{parse_rule_document, ParsedRules, RuleConfig};
pub use observe::{NoopObserver, Observer, RecordingObserver, ShardEvent, TracingObserver};
pub use optimizer::Optimizer;
pub use registry::{Registry, RegistryBuilder, Routine};
