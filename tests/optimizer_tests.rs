//! End-to-end routing tests for the optimizer entry point

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use shardopt_core::ast::{SelectStmt, Statement, StatementKind, TableName};
use shardopt_core::config::OptimizerConfig;
use shardopt_core::error::Error;
use shardopt_core::rule::{Rule, RuleError, ShardingRule, Topology, VirtualTable};
use shardopt_core::value::{BoundArgs, Value};
use shardopt_optimizer::{CancelToken, Optimizer, RecordingObserver, Registry};
use shardopt_plan::Plan;

fn scenario_rule() -> Rule {
    Rule::new().with_table(VirtualTable::new(
        "t",
        Topology::new([("db0", ["t_0", "t_1"]), ("db1", ["t_0", "t_1"])]),
    ))
}

fn args() -> BoundArgs {
    BoundArgs::new(vec![Value::I64(42), Value::from("x"), Value::Null])
}

fn targets(plan: &Plan) -> Vec<(String, Vec<String>)> {
    plan.targets()
        .into_iter()
        .map(|t| (t.database, t.tables))
        .collect()
}

#[test]
fn test_unsharded_table_single_leaf() {
    let registry = Registry::with_defaults();
    let rule = scenario_rule();
    let optimizer = Optimizer::new(&registry, &rule);

    let stmt = Arc::new(Statement::create_table("plain"));
    let input = args();
    let plan = optimizer.optimize(&stmt, &input).expect("optimize");

    let leaf = plan.as_leaf().expect("unsharded tables are not wrapped");
    assert_eq!(leaf.database(), "");
    assert_eq!(leaf.tables(), &["plain".to_string()]);
    assert_eq!(leaf.args(), &input);
    assert_eq!(leaf.statement(), stmt.as_ref());
}

#[test]
fn test_concrete_scenario() {
    let registry = Registry::with_defaults();
    let rule = scenario_rule();
    let optimizer = Optimizer::new(&registry, &rule);

    let stmt = Arc::new(Statement::create_table("t"));
    let input = args();
    let plan = optimizer.optimize(&stmt, &input).expect("optimize");

    assert!(plan.is_composite());
    assert_eq!(
        targets(&plan),
        vec![
            ("db0".to_string(), vec!["t_0".to_string(), "t_1".to_string()]),
            ("db1".to_string(), vec!["t_0".to_string(), "t_1".to_string()]),
        ]
    );
    for leaf in plan.leaves() {
        assert_eq!(leaf.args().as_slice(), input.as_slice());
        assert_eq!(leaf.kind(), StatementKind::CreateTable);
    }
}

#[test]
fn test_full_expansion_one_leaf_per_database() {
    let registry = Registry::with_defaults();
    let topology = Topology::uniform("ds_", "orders", 8, 4);
    let rule = Rule::new().with_table(VirtualTable::new("orders", topology.clone()));
    let optimizer = Optimizer::new(&registry, &rule);

    let stmt = Arc::new(Statement::create_table("orders"));
    let plan = optimizer.optimize(&stmt, &args()).expect("optimize");

    let composite = plan.as_composite().expect("composite");
    assert_eq!(composite.len(), 8);

    let shards = topology.enumerate();
    for (leaf, (db, tables)) in plan.leaves().into_iter().zip(shards.iter()) {
        assert_eq!(leaf.database(), db);
        assert_eq!(leaf.tables(), tables);
    }
}

#[test]
fn test_coverage_matches_enumeration_exactly() {
    let registry = Registry::with_defaults();
    let topology = Topology::new([
        ("db0", vec!["u_0", "u_3"]),
        ("db1", vec!["u_1"]),
        ("db2", vec!["u_2", "u_4", "u_5"]),
        // Repeated entries collapse at construction.
        ("db0", vec!["u_3", "u_6"]),
    ]);
    let rule = Rule::new().with_table(VirtualTable::new("u", topology.clone()));
    let optimizer = Optimizer::new(&registry, &rule);

    let plan = optimizer
        .optimize(&Arc::new(Statement::create_table("u")), &BoundArgs::empty())
        .expect("optimize");

    let covered = plan.shard_pairs();
    let expected: Vec<(String, String)> = topology
        .enumerate()
        .pairs()
        .map(|(db, t)| (db.to_string(), t.to_string()))
        .collect();

    assert_eq!(covered, expected);
    let unique: HashSet<_> = covered.iter().collect();
    assert_eq!(unique.len(), covered.len(), "no pair is duplicated");
    assert_eq!(covered.len(), 7);
}

#[test]
fn test_determinism() {
    let registry = Registry::with_defaults();
    let rule = Rule::new().with_table(VirtualTable::new("t", Topology::uniform("db", "t", 5, 3)));
    let optimizer = Optimizer::new(&registry, &rule);
    let stmt = Arc::new(Statement::create_table("t"));

    let a = optimizer.optimize(&stmt, &args()).expect("first");
    let b = optimizer.optimize(&stmt, &args()).expect("second");

    assert_eq!(a, b);
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());

    // A fresh optimizer over an equal rule set agrees too.
    let rule2 = rule.clone();
    let c = Optimizer::new(Registry::global(), &rule2)
        .optimize(&stmt, &args())
        .expect("third");
    assert_eq!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
}

#[test]
fn test_unknown_kind_is_unsupported() {
    let registry = Registry::with_defaults();
    let rule = scenario_rule();
    let optimizer = Optimizer::new(&registry, &rule);

    let stmt = Arc::new(Statement::Select(SelectStmt {
        from: vec![TableName::new("t")],
        sql: "SELECT * FROM t WHERE id = ?".into(),
    }));
    let err = optimizer.optimize(&stmt, &args()).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedStatementKind(StatementKind::Select)
    ));

    // An empty registry supports nothing, not even DDL.
    let empty = Registry::builder().build();
    let err = Optimizer::new(&empty, &rule)
        .optimize(&Arc::new(Statement::create_table("t")), &args())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedStatementKind(StatementKind::CreateTable)
    ));
}

struct BrokenRules;

impl ShardingRule for BrokenRules {
    fn virtual_table(&self, name: &str) -> Result<Option<&VirtualTable>, RuleError> {
        Err(RuleError::Malformed {
            table: name.to_string(),
            reason: "topology references unknown group".into(),
        })
    }
}

#[test]
fn test_rule_engine_errors_propagate() {
    let registry = Registry::with_defaults();
    let optimizer = Optimizer::new(&registry, &BrokenRules);

    let err = optimizer
        .optimize(&Arc::new(Statement::create_table("t")), &args())
        .unwrap_err();
    match err {
        Error::Rule(RuleError::Malformed { table, .. }) => assert_eq!(table, "t"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_default_database_from_config() {
    let registry = Registry::with_defaults();
    let rule = scenario_rule();
    let optimizer = Optimizer::new(&registry, &rule).with_config(OptimizerConfig {
        default_database: "main".into(),
        ..OptimizerConfig::default()
    });

    let plan = optimizer
        .optimize(&Arc::new(Statement::truncate("plain")), &BoundArgs::empty())
        .expect("optimize");
    assert_eq!(targets(&plan), vec![("main".to_string(), vec!["plain".to_string()])]);
}

#[test]
fn test_observer_receives_shard_events() {
    let registry = Registry::with_defaults();
    let rule = scenario_rule();
    let observer = RecordingObserver::new();
    let optimizer = Optimizer::new(&registry, &rule).with_observer(&observer);

    optimizer
        .optimize(&Arc::new(Statement::create_table("t")), &BoundArgs::empty())
        .expect("sharded");
    optimizer
        .optimize(&Arc::new(Statement::create_table("plain")), &BoundArgs::empty())
        .expect("unsharded");

    let events = observer.events();
    assert_eq!(events.len(), 2);
    assert_eq!((events[0].shards, events[0].tables, events[0].full_scan), (2, 4, true));
    assert_eq!((events[1].shards, events[1].tables, events[1].full_scan), (1, 1, false));
}

#[test]
fn test_diagnostics_can_be_disabled() {
    let registry = Registry::with_defaults();
    let rule = scenario_rule();
    let observer = RecordingObserver::new();
    let optimizer = Optimizer::new(&registry, &rule)
        .with_config(OptimizerConfig {
            diagnostics: false,
            ..OptimizerConfig::default()
        })
        .with_observer(&observer);

    optimizer
        .optimize(&Arc::new(Statement::create_table("t")), &BoundArgs::empty())
        .expect("optimize");
    assert!(observer.events().is_empty());
}

#[test]
fn test_cancelled_token_stops_before_dispatch() {
    let registry = Registry::with_defaults();
    let rule = scenario_rule();
    let optimizer = Optimizer::new(&registry, &rule);
    let token = CancelToken::new();

    let stmt = Arc::new(Statement::create_table("t"));
    assert!(optimizer.optimize_with_cancel(&stmt, &args(), &token).is_ok());

    token.cancel();
    let err = optimizer
        .optimize_with_cancel(&stmt, &args(), &token)
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));

    // Cancellation wins even over an unsupported kind.
    let select = Arc::new(Statement::Select(SelectStmt {
        from: vec![],
        sql: "SELECT 1".into(),
    }));
    assert!(matches!(
        optimizer.optimize_with_cancel(&select, &args(), &token),
        Err(Error::Cancelled)
    ));
}

#[test]
fn test_concurrent_optimization_shares_one_optimizer() {
    let rule = Rule::new().with_table(VirtualTable::new("t", Topology::uniform("db", "t", 4, 2)));
    let optimizer = Optimizer::new(Registry::global(), &rule);
    let stmt = Arc::new(Statement::create_table("t"));
    let baseline = optimizer
        .optimize(&stmt, &args())
        .expect("baseline")
        .fingerprint()
        .unwrap();

    thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    (0..50)
                        .map(|_| optimizer.optimize(&stmt, &args()).unwrap().fingerprint().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for h in handles {
            for fp in h.join().expect("worker panicked") {
                assert_eq!(fp, baseline);
            }
        }
    });
}

#[test]
fn test_plan_serializes_to_json() {
    let registry = Registry::with_defaults();
    let rule = scenario_rule();
    let plan = Optimizer::new(&registry, &rule)
        .optimize(&Arc::new(Statement::create_table("t")), &args())
        .expect("optimize");

    let json = serde_json::to_value(&plan).expect("serialize");
    let plans = json["Composite"]["plans"].as_array().expect("plans array");
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[1]["Leaf"]["database"], "db1");
    assert_eq!(plans[0]["Leaf"]["args"][0]["I64"], 42);

    let back: Plan = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, plan);
}

#[test]
fn test_decoded_rule_with_repeated_entries_covers_each_pair_once() {
    let json = r#"{"vtabs":{"t":{"name":"t","topology":{"shards":[
        ["db0",["t_0","t_0"]],
        ["db1",["t_2"]],
        ["db0",["t_1"]]
    ]}}}}"#;
    let rule: Rule = serde_json::from_str(json).expect("decode rule");
    let registry = Registry::with_defaults();
    let plan = Optimizer::new(&registry, &rule)
        .optimize(&Arc::new(Statement::create_table("t")), &BoundArgs::empty())
        .expect("optimize");

    let covered = plan.shard_pairs();
    let unique: HashSet<_> = covered.iter().collect();
    assert_eq!(unique.len(), covered.len());
    assert_eq!(
        targets(&plan),
        vec![
            ("db0".to_string(), vec!["t_0".to_string(), "t_1".to_string()]),
            ("db1".to_string(), vec!["t_2".to_string()]),
        ]
    );

    // Re-encoding the decoded rule keeps it stable.
    let again: Rule = serde_json::from_value(serde_json::to_value(&rule).unwrap()).unwrap();
    assert_eq!(again, rule);
}

#[test]
fn test_empty_topology_yields_empty_composite() {
    let registry = Registry::with_defaults();
    let observer = RecordingObserver::new();
    let rule = Rule::new()
        .with_table(VirtualTable::new("ghost", Topology::default()))
        .with_table(VirtualTable::new(
            "hollow",
            Topology::new([("db0", Vec::<String>::new()), ("db1", Vec::new())]),
        ));
    let optimizer = Optimizer::new(&registry, &rule).with_observer(&observer);

    for name in ["ghost", "hollow"] {
        let plan = optimizer
            .optimize(&Arc::new(Statement::create_table(name)), &args())
            .expect("empty topology is not an error");
        let composite = plan.as_composite().expect("found rule expands to a composite");
        assert_eq!(composite.len(), 0);
        assert_eq!(plan.leaf_count(), 0);
    }

    let events = observer.events();
    assert_eq!(events.len(), 2);
    for event in &events {
        assert!(event.full_scan);
        assert_eq!((event.shards, event.tables), (0, 0));
    }
}
