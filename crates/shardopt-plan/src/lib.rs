#![forbid(unsafe_code)]
//! shardopt-plan: executable plan trees handed to the execution layer.
//!
//! Design intent:
//! - A `Plan` is either a `LeafPlan` (one statement bound to one physical
//!   database) or a `CompositePlan` (an ordered list of sub-plans run as one
//!   logical statement). Nesting is uniform; nothing special-cases depth.
//! - Plans are plain data. Running them is the job of an `Executor`
//!   supplied by the execution layer; `Plan::execute` is a reference driver.

pub mod plan;
pub mod traits;

pub use plan::{CompositePlan, LeafPlan, Plan, ShardTarget};
pub use traits::{Executor, LeafOutcome, ShardFailure};
