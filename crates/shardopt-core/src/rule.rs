//! Sharding rules: which logical tables are sharded, and onto what.
//!
//! A `Rule` maps logical table names to `VirtualTable`s; each virtual table
//! owns a `Topology` that enumerates the physical (database, table) pairs
//! realizing it. Topology enumeration order is the order databases (and
//! tables within a database) were first declared, so plans built from it
//! are reproducible.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised by a rule engine while answering a lookup.
///
/// "No rule for this table" is *not* an error; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule engine unavailable: {0}")]
    Unavailable(String),

    #[error("malformed rule for table '{table}': {reason}")]
    Malformed { table: String, reason: String },
}

/// Source of sharding definitions consulted by the optimizer.
pub trait ShardingRule: Send + Sync {
    /// Look up the virtual table governing `name`.
    fn virtual_table(&self, name: &str) -> Result<Option<&VirtualTable>, RuleError>;
}

/// Ordered `database -> tables` enumeration produced by a topology.
///
/// Each (database, table) pair appears exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseTables(Vec<(String, Vec<String>)>);

impl DatabaseTables {
    /// Number of databases.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of physical tables across all databases.
    pub fn table_count(&self) -> usize {
        self.0.iter().map(|(_, t)| t.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.0.iter().map(|(db, t)| (db.as_str(), t.as_slice()))
    }

    pub fn get(&self, database: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(db, _)| db == database)
            .map(|(_, t)| t.as_slice())
    }

    /// Flattened (database, table) pairs in enumeration order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0
            .iter()
            .flat_map(|(db, t)| t.iter().map(move |tbl| (db.as_str(), tbl.as_str())))
    }
}

impl<'a> IntoIterator for &'a DatabaseTables {
    type Item = &'a (String, Vec<String>);
    type IntoIter = std::slice::Iter<'a, (String, Vec<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Physical realization of one logical table.
///
/// Deserialization goes through `Topology::new`, so a decoded topology is
/// as duplicate-free as a constructed one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTopology")]
pub struct Topology {
    shards: Vec<(String, Vec<String>)>,
}

#[derive(Deserialize)]
struct RawTopology {
    #[serde(default)]
    shards: Vec<(String, Vec<String>)>,
}

impl From<RawTopology> for Topology {
    fn from(raw: RawTopology) -> Self {
        Topology::new(raw.shards)
    }
}

impl Topology {
    /// Build from `(database, tables)` entries.
    ///
    /// Repeated databases are merged into their first occurrence and
    /// repeated tables within a database are dropped, so the result is
    /// duplicate-free regardless of input.
    pub fn new<I, D, T, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (D, T)>,
        D: Into<String>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut shards: Vec<(String, Vec<String>)> = Vec::new();
        let mut index: HashMap<String, (usize, HashSet<String>)> = HashMap::new();
        for (db, tables) in entries {
            let (idx, seen) = match index.entry(db.into()) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => {
                    shards.push((e.key().clone(), Vec::new()));
                    e.insert((shards.len() - 1, HashSet::new()))
                }
            };
            let slot = &mut shards[*idx].1;
            for table in tables {
                let table = table.into();
                if seen.insert(table.clone()) {
                    slot.push(table);
                }
            }
        }
        Self { shards }
    }

    /// `databases` databases named `{db_prefix}{i}`, each holding
    /// `tables_per_db` tables named `{table_prefix}_{j}` with `j` numbered
    /// globally across databases.
    pub fn uniform(db_prefix: &str, table_prefix: &str, databases: usize, tables_per_db: usize) -> Self {
        Self::new((0..databases).map(move |d| {
            let tables = (0..tables_per_db)
                .map(move |t| format!("{}_{}", table_prefix, d * tables_per_db + t));
            (format!("{}{}", db_prefix, d), tables)
        }))
    }

    /// Add tables to `database`, creating it if absent.
    pub fn extend_database<D, T, S>(&mut self, database: D, tables: T)
    where
        D: Into<String>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let database = database.into();
        let idx = match self.shards.iter().position(|(db, _)| *db == database) {
            Some(idx) => idx,
            None => {
                self.shards.push((database, Vec::new()));
                self.shards.len() - 1
            }
        };
        let slot = &mut self.shards[idx].1;
        let mut seen: HashSet<String> = slot.iter().cloned().collect();
        for table in tables {
            let table = table.into();
            if seen.insert(table.clone()) {
                slot.push(table);
            }
        }
    }

    pub fn database_count(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|(_, t)| t.is_empty())
    }

    /// Every physical shard, in declaration order. Databases that ended up
    /// with no tables are skipped.
    pub fn enumerate(&self) -> DatabaseTables {
        DatabaseTables(
            self.shards
                .iter()
                .filter(|(_, t)| !t.is_empty())
                .cloned()
                .collect(),
        )
    }
}

/// Sharding definition for one logical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualTable {
    pub name: String,
    pub topology: Topology,
}

impl VirtualTable {
    pub fn new(name: impl Into<String>, topology: Topology) -> Self {
        Self {
            name: name.into(),
            topology,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }
}

/// In-memory rule set keyed by logical table name.
/// We use a BTreeMap to keep deterministic order for listing/hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    vtabs: BTreeMap<String, VirtualTable>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, vt: VirtualTable) -> Self {
        self.insert(vt);
        self
    }

    /// Insert or replace the definition for `vt.name`.
    pub fn insert(&mut self, vt: VirtualTable) -> Option<VirtualTable> {
        self.vtabs.insert(vt.name.clone(), vt)
    }

    pub fn vtable(&self, name: &str) -> Option<&VirtualTable> {
        self.vtabs.get(name)
    }

    pub fn len(&self) -> usize {
        self.vtabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vtabs.is_empty()
    }

    pub fn tables(&self) -> impl Iterator<Item = &VirtualTable> + '_ {
        self.vtabs.values()
    }
}

impl ShardingRule for Rule {
    fn virtual_table(&self, name: &str) -> Result<Option<&VirtualTable>, RuleError> {
        Ok(self.vtable(name))
    }
}
