//! shardopt CLI: explain how a DDL statement would be routed across shards.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use shardopt_core::ast::{SelectStmt, Statement, TableName};
use shardopt_core::config::OptimizerConfig;
use shardopt_core::value::{BoundArgs, Value};
use shardopt_optimizer::{parse_rule_document, Optimizer, Registry, TracingObserver};

#[derive(Parser)]
#[command(name = "shardopt", version = shardopt_core::VERSION)]
#[command(about = "Statement-routing optimizer for sharded SQL schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the plan a statement would produce (EXPLAIN)
    Explain {
        /// Path to the rule YAML file
        #[arg(short, long)]
        rules: PathBuf,

        /// Statement kind to plan
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// Logical table name (repeat for DROP TABLE)
        #[arg(short, long = "table", required = true)]
        tables: Vec<String>,

        /// Bound argument value (repeatable, in order)
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Default database for unsharded tables (overrides config)
        #[arg(long)]
        default_database: Option<String>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a rule YAML file
    Validate {
        /// Path to the rule YAML file
        #[arg(short, long)]
        rules: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    CreateTable,
    DropTable,
    Truncate,
    Select,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Explain {
            rules,
            kind,
            tables,
            args,
            default_database,
            json,
        } => {
            if let Err(e) = explain(&rules, kind, &tables, &args, default_database, json) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Validate { rules } => {
            if let Err(e) = validate(&rules) {
                eprintln!("Validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn build_statement(kind: KindArg, tables: &[String]) -> Result<Statement, String> {
    let single = || match tables {
        [t] => Ok(TableName::parse(t)),
        _ => Err(format!("{:?} takes exactly one --table", kind)),
    };

    Ok(match kind {
        KindArg::CreateTable => Statement::create_table(single()?),
        KindArg::Truncate => Statement::truncate(single()?),
        KindArg::DropTable => Statement::drop_table(tables.iter().map(|t| TableName::parse(t))),
        KindArg::Select => {
            let from: Vec<TableName> = tables.iter().map(|t| TableName::parse(t)).collect();
            let names: Vec<String> = from.iter().map(ToString::to_string).collect();
            Statement::Select(SelectStmt {
                sql: format!("SELECT * FROM {}", names.join(", ")),
                from,
            })
        }
    })
}

fn explain(
    rules_path: &PathBuf,
    kind: KindArg,
    tables: &[String],
    args: &[String],
    default_database: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let yaml_content = fs::read_to_string(rules_path)?;
    let parsed = parse_rule_document(&yaml_content)?;

    // Environment first, then the rule document, then CLI flags.
    let mut config = OptimizerConfig::from_env();
    parsed.config.apply_to(&mut config);
    if let Some(db) = default_database {
        config.default_database = db;
    }

    let stmt = Arc::new(build_statement(kind, tables)?);
    let bound: BoundArgs = args.iter().map(|a| Value::parse_loose(a)).collect();

    let observer = TracingObserver;
    let optimizer = Optimizer::new(Registry::global(), &parsed.rule)
        .with_config(config)
        .with_observer(&observer);
    let plan = optimizer.optimize(&stmt, &bound)?;
    tracing::debug!(leaves = plan.leaf_count(), "optimized");

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Statement: {}", stmt);
    if !bound.is_empty() {
        let rendered: Vec<String> = bound.iter().map(ToString::to_string).collect();
        println!("Arguments: [{}]", rendered.join(", "));
    }
    println!("Leaves:    {}", plan.leaf_count());
    println!("Plan hash: {}", plan.fingerprint()?.short());
    println!();
    print!("{}", plan);

    Ok(())
}

fn validate(rules_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let yaml_content = fs::read_to_string(rules_path)?;
    let parsed = parse_rule_document(&yaml_content)?;

    println!("✓ Rules are valid ({} sharded tables)", parsed.rule.len());
    for vt in parsed.rule.tables() {
        let shards = vt.topology().enumerate();
        println!(
            "  {}: {} databases, {} physical tables",
            vt.name,
            shards.len(),
            shards.table_count()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardopt_core::ast::StatementKind;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn create_table_needs_exactly_one_table() {
        let stmt = build_statement(KindArg::CreateTable, &names(&["shop.t"])).unwrap();
        assert_eq!(stmt.kind(), StatementKind::CreateTable);
        assert_eq!(stmt.sql(), "CREATE TABLE shop.t");

        assert!(build_statement(KindArg::CreateTable, &names(&["a", "b"])).is_err());
        assert!(build_statement(KindArg::Truncate, &[]).is_err());
    }

    #[test]
    fn drop_and_select_accept_many_tables() {
        let drop = build_statement(KindArg::DropTable, &names(&["a", "b"])).unwrap();
        assert_eq!(drop.tables().len(), 2);

        let select = build_statement(KindArg::Select, &names(&["a"])).unwrap();
        assert_eq!(select.kind(), StatementKind::Select);
        assert_eq!(select.sql(), "SELECT * FROM a");
    }

    #[test]
    fn select_is_not_routed_by_default_registry() {
        let stmt = Arc::new(build_statement(KindArg::Select, &names(&["a"])).unwrap());
        let rule = shardopt_core::rule::Rule::new();
        let err = Optimizer::new(Registry::global(), &rule)
            .optimize(&stmt, &BoundArgs::empty())
            .unwrap_err();
        assert_eq!(err.to_string(), "unsupported statement kind: SELECT");
    }
}
