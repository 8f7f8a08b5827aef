//! Optimizer configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Database targeted by statements on unsharded tables. Empty means the
    /// backend's default database.
    pub default_database: String,

    /// Report computed shard sets to the observer.
    pub diagnostics: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            default_database: String::new(),
            diagnostics: true,
        }
    }
}

impl OptimizerConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SHARDOPT_DEFAULT_DATABASE`: target database for unsharded tables
    /// - `SHARDOPT_DIAGNOSTICS`: `true`/`false`, `1`/`0`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading through an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(s) = lookup("SHARDOPT_DEFAULT_DATABASE") {
            cfg.default_database = s.trim().to_string();
        }

        if let Some(s) = lookup("SHARDOPT_DIAGNOSTICS") {
            if let Some(v) = parse_flag(&s) {
                cfg.diagnostics = v;
            }
        }

        cfg
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
