use rule_engine::{Condition, FactValue, Facts, Operator, Rule, RuleSet, Session, TraceEntry};

fn facts(pairs: &[(&str, FactValue)]) -> Facts {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn single_condition_rule_yields_strength() {
    let rules = RuleSet::new(vec![Rule::new(
        "R1",
        vec![Condition::new("amount", Operator::Gt, 10)],
        "high_amount",
        0.6,
    )])
    .unwrap();
    let mut session = Session::new(rules.shared());
    session.load_data(&facts(&[("amount", FactValue::Int(20))]));
    session.forward_chain();

    let confidence = session.inferred_facts()["high_amount"];
    assert!((confidence - 0.6).abs() < 1e-12);
}

#[test]
fn load_data_leaves_caller_map_untouched() {
    let rules = RuleSet::new(vec![]).unwrap().shared();
    let mut session = Session::new(rules)
        .with_defaults(facts(&[("vpn_detected", FactValue::Bool(false))]));

    let data = facts(&[("amount", FactValue::Int(100))]);
    let snapshot = data.clone();
    session.load_data(&data);

    assert_eq!(data, snapshot);
    assert_eq!(session.value("vpn_detected"), Some(&FactValue::Bool(false)));
}

#[test]
fn cyclic_rules_terminate() {
    let rules = RuleSet::new(vec![
        Rule::new("A1", vec![Condition::is_true("fact_a")], "fact_b", 0.8),
        Rule::new("B1", vec![Condition::is_true("fact_b")], "fact_a", 0.7),
    ])
    .unwrap();
    let mut session = Session::new(rules.shared());
    session.load_data(&facts(&[("fact_a", FactValue::Bool(true))]));
    let report = session.forward_chain();

    assert!(report.converged);
    assert!(session.is_derived("fact_a"));
    assert!(session.is_derived("fact_b"));
    assert!(session.has_fired("A1"));
    assert!(session.has_fired("B1"));
    assert!((session.confidence("fact_b").unwrap() - 0.8).abs() < 1e-12);
    assert!((session.confidence("fact_a").unwrap() - 0.56).abs() < 1e-12);
}

#[test]
fn shared_rule_table_isolated_between_sessions() {
    let rules = RuleSet::new(vec![Rule::new(
        "R1",
        vec![Condition::new("amount", Operator::Gt, 10)],
        "high_amount",
        0.6,
    )])
    .unwrap()
    .shared();

    let mut first = Session::new(rules.clone());
    let second = Session::new(rules);
    first.load_data(&facts(&[("amount", FactValue::Int(20))]));
    first.forward_chain();

    assert!(first.is_derived("high_amount"));
    assert!(!second.is_derived("high_amount"));
    assert!(second.fired_rules().is_empty());
}

#[test]
fn trace_records_fired_and_updated() {
    let rules = RuleSet::new(vec![
        Rule::new("A", vec![Condition::new("amount", Operator::Ge, 500)], "high_amount", 0.6),
        Rule::new("B", vec![Condition::new("amount", Operator::Ge, 1500)], "high_amount", 0.5),
        Rule::new("C", vec![Condition::new("country", Operator::Eq, "FR")], "domestic", 0.9),
    ])
    .unwrap();
    let mut session = Session::new(rules.shared());
    session.load_data(&facts(&[
        ("amount", FactValue::Int(2000)),
        ("country", FactValue::from("FR")),
    ]));
    session.forward_chain();

    let trace = session.trace();
    assert_eq!(trace.len(), 3);
    assert!(trace
        .iter()
        .map(|e| e.to_string())
        .all(|line| line.contains("Fired") || line.contains("Updated")));
    assert!(matches!(&trace[1], TraceEntry::Updated { rule_id, .. } if rule_id == "B"));
    assert!((session.confidence("high_amount").unwrap() - 0.8).abs() < 1e-12);
}

#[test]
fn incomparable_condition_does_not_abort() {
    let rules = RuleSet::new(vec![
        Rule::new("X", vec![Condition::new("country", Operator::Gt, 3)], "odd", 0.9),
        Rule::new("Y", vec![Condition::new("amount", Operator::Gt, 3)], "ok", 0.9),
    ])
    .unwrap();
    let mut session = Session::new(rules.shared());
    session.load_data(&facts(&[
        ("country", FactValue::from("FR")),
        ("amount", FactValue::Int(4)),
    ]));
    session.forward_chain();

    assert!(!session.is_derived("odd"));
    assert!(!session.has_fired("X"));
    assert!(session.is_derived("ok"));
}
