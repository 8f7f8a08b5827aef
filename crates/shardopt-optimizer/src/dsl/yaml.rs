//! Minimal YAML → `Rule` loader.
//!
//! Example:
//! ```yaml
//! config:
//!   default_database: main
//! tables:
//!   - name: orders
//!     shards:
//!       - { database: db0, tables: [orders_0, orders_1] }
//!       - { database: db1, tables: [orders_2, orders_3] }
//!   - name: users
//!     uniform: { databases: 4, tables_per_db: 2 }
//! ```
//!
//! Each table gives either an explicit `shards` list (order is kept) or a
//! `uniform` layout, never both.

use serde::{Deserialize, Serialize};

use shardopt_core::config::OptimizerConfig;
use shardopt_core::error::{Error, Result};
use shardopt_core::rule::{Rule, Topology, VirtualTable};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    #[serde(default)]
    pub config: Option<RuleConfig>,
    #[serde(default)]
    pub tables: Vec<TableDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub shards: Vec<ShardDef>,
    #[serde(default)]
    pub uniform: Option<UniformDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShardDef {
    pub database: String,
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UniformDef {
    pub databases: usize,
    pub tables_per_db: usize,
    /// Defaults to `db`.
    #[serde(default)]
    pub db_prefix: Option<String>,
    /// Defaults to the table name.
    #[serde(default)]
    pub table_prefix: Option<String>,
}

/// Optimizer overrides carried inside a rule document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleConfig {
    pub default_database: Option<String>,
    pub diagnostics: Option<bool>,
}

impl RuleConfig {
    pub fn apply_to(&self, cfg: &mut OptimizerConfig) {
        if let Some(db) = &self.default_database {
            cfg.default_database = db.clone();
        }
        if let Some(d) = self.diagnostics {
            cfg.diagnostics = d;
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedRules {
    pub rule: Rule,
    pub config: RuleConfig,
}

impl TableDef {
    fn to_topology(&self) -> Result<Topology> {
        match (&self.uniform, self.shards.is_empty()) {
            (Some(_), false) => Err(Error::Config(format!(
                "table '{}': give either 'shards' or 'uniform', not both",
                self.name
            ))),
            (None, true) => Err(Error::Config(format!(
                "table '{}': no shards declared",
                self.name
            ))),
            (Some(u), true) => {
                if u.databases == 0 || u.tables_per_db == 0 {
                    return Err(Error::Config(format!(
                        "table '{}': uniform layout needs at least one database and one table",
                        self.name
                    )));
                }
                Ok(Topology::uniform(
                    u.db_prefix.as_deref().unwrap_or("db"),
                    u.table_prefix.as_deref().unwrap_or(&self.name),
                    u.databases,
                    u.tables_per_db,
                ))
            }
            (None, false) => {
                if let Some(s) = self.shards.iter().find(|s| s.tables.is_empty()) {
                    return Err(Error::Config(format!(
                        "table '{}': database '{}' lists no tables",
                        self.name, s.database
                    )));
                }
                Ok(Topology::new(
                    self.shards
                        .iter()
                        .map(|s| (s.database.as_str(), s.tables.iter().map(String::as_str))),
                ))
            }
        }
    }
}

/// Parse a YAML rule document into a `Rule` plus config overrides.
pub fn parse_rule_document(yaml_src: &str) -> Result<ParsedRules> {
    let doc: RuleDocument =
        serde_yaml::from_str(yaml_src).map_err(|e| Error::Config(e.to_string()))?;

    let mut rule = Rule::new();
    for def in &doc.tables {
        let topology = def.to_topology()?;
        if rule.insert(VirtualTable::new(def.name.clone(), topology)).is_some() {
            return Err(Error::Config(format!(
                "table '{}' declared more than once",
                def.name
            )));
        }
    }

    Ok(ParsedRules {
        rule,
        config: doc.config.unwrap_or_default(),
    })
}
