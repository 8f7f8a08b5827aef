//! Plan trees: `LeafPlan`, `CompositePlan`, and the `Plan` variant over them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use shardopt_core::ast::{Statement, StatementKind};
use shardopt_core::error::Result;
use shardopt_core::hash::{hash_serde, Hash256};
use shardopt_core::value::BoundArgs;

/// One physical destination: a database and the tables touched in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardTarget {
    pub database: String,
    pub tables: Vec<String>,
}

impl fmt::Display for ShardTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let db = if self.database.is_empty() {
            "<default>"
        } else {
            self.database.as_str()
        };
        write!(f, "{}[{}]", db, self.tables.join(","))
    }
}

/// A statement bound to exactly one physical database.
///
/// The statement itself is shared between all leaves of a plan; so are the
/// bound arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafPlan {
    stmt: Arc<Statement>,
    database: String,
    tables: Vec<String>,
    args: BoundArgs,
}

impl LeafPlan {
    /// Pure construction. Table-set cardinality is the caller's concern:
    /// schema-creation wants exactly one name, other kinds may pass several.
    pub fn new(
        stmt: Arc<Statement>,
        database: impl Into<String>,
        tables: Vec<String>,
        args: BoundArgs,
    ) -> Self {
        Self {
            stmt,
            database: database.into(),
            tables,
            args,
        }
    }

    /// Replace the attached arguments.
    pub fn bind_args(&mut self, args: BoundArgs) {
        self.args = args;
    }

    pub fn statement(&self) -> &Statement {
        &self.stmt
    }

    pub fn kind(&self) -> StatementKind {
        self.stmt.kind()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn args(&self) -> &BoundArgs {
        &self.args
    }

    pub fn target(&self) -> ShardTarget {
        ShardTarget {
            database: self.database.clone(),
            tables: self.tables.clone(),
        }
    }
}

/// Ordered sub-plans executed as a single logical statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositePlan {
    plans: Vec<Plan>,
}

impl CompositePlan {
    pub fn new(plans: Vec<Plan>) -> Self {
        Self { plans }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            plans: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, plan: impl Into<Plan>) {
        self.plans.push(plan.into());
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn into_plans(self) -> Vec<Plan> {
        self.plans
    }
}

impl FromIterator<LeafPlan> for CompositePlan {
    fn from_iter<I: IntoIterator<Item = LeafPlan>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Plan::Leaf).collect())
    }
}

/// What the optimizer hands to the execution layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Plan {
    Leaf(LeafPlan),
    Composite(CompositePlan),
}

impl Plan {
    pub fn is_composite(&self) -> bool {
        matches!(self, Plan::Composite(_))
    }

    pub fn as_leaf(&self) -> Option<&LeafPlan> {
        match self {
            Plan::Leaf(l) => Some(l),
            Plan::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositePlan> {
        match self {
            Plan::Composite(c) => Some(c),
            Plan::Leaf(_) => None,
        }
    }

    /// All leaves, depth-first, in execution order.
    pub fn leaves(&self) -> Vec<&LeafPlan> {
        fn walk<'a>(plan: &'a Plan, out: &mut Vec<&'a LeafPlan>) {
            match plan {
                Plan::Leaf(l) => out.push(l),
                Plan::Composite(c) => {
                    for p in c.plans() {
                        walk(p, out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Plan::Leaf(_) => 1,
            Plan::Composite(c) => c.plans().iter().map(Plan::leaf_count).sum(),
        }
    }

    pub fn targets(&self) -> Vec<ShardTarget> {
        self.leaves().into_iter().map(LeafPlan::target).collect()
    }

    /// Flattened (database, table) pairs covered by the leaves.
    pub fn shard_pairs(&self) -> Vec<(String, String)> {
        self.leaves()
            .into_iter()
            .flat_map(|l| {
                l.tables()
                    .iter()
                    .map(move |t| (l.database().to_string(), t.clone()))
            })
            .collect()
    }

    /// Stable digest of the whole tree, arguments included.
    pub fn fingerprint(&self) -> Result<Hash256> {
        hash_serde(self)
    }
}

impl From<LeafPlan> for Plan {
    fn from(l: LeafPlan) -> Self {
        Plan::Leaf(l)
    }
}

impl From<CompositePlan> for Plan {
    fn from(c: CompositePlan) -> Self {
        Plan::Composite(c)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(plan: &Plan, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let pad = "  ".repeat(depth);
            match plan {
                Plan::Leaf(l) => writeln!(f, "{}{} -> {}", pad, l.kind(), l.target()),
                Plan::Composite(c) => {
                    writeln!(f, "{}Composite({})", pad, c.len())?;
                    for p in c.plans() {
                        write_node(p, depth + 1, f)?;
                    }
                    Ok(())
                }
            }
        }
        write_node(self, 0, f)
    }
}
