use proptest::prelude::*;
use rule_engine::{combine, evaluate, Condition, FactValue, Operator, Rule, RuleSet, Session};
use std::collections::HashMap;

fn operator() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::Gt),
        Just(Operator::Lt),
        Just(Operator::Ge),
        Just(Operator::Le),
        Just(Operator::Eq),
        Just(Operator::Ne),
    ]
}

fn fact_value() -> impl Strategy<Value = FactValue> {
    prop_oneof![
        any::<bool>().prop_map(FactValue::Bool),
        any::<i64>().prop_map(FactValue::Int),
        any::<f64>().prop_map(FactValue::Float),
        "[a-z]{0,6}".prop_map(FactValue::Text),
    ]
}

// ── Combiner laws ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn combine_is_symmetric(c1 in 0.0f64..=1.0, c2 in 0.0f64..=1.0) {
        prop_assert!((combine(c1, c2) - combine(c2, c1)).abs() < 1e-12);
    }

    #[test]
    fn combine_with_zero_is_identity(c in 0.0f64..=1.0) {
        prop_assert!((combine(c, 0.0) - c).abs() < 1e-12);
    }

    #[test]
    fn combine_with_one_saturates(c in 0.0f64..=1.0) {
        prop_assert!((combine(c, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn combine_stays_in_unit_interval(c1 in 0.0f64..=1.0, c2 in 0.0f64..=1.0) {
        let c = combine(c1, c2);
        prop_assert!((0.0..=1.0).contains(&c));
        prop_assert!(c + 1e-12 >= c1.max(c2));
    }
}

// ── Evaluator totality ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn evaluation_never_panics_and_stays_bounded(
        value in fact_value(),
        target in fact_value(),
        op in operator(),
        derived in proptest::option::of(0.0f64..=1.0),
    ) {
        let mut values = HashMap::new();
        values.insert("f".to_string(), value);
        let mut inferred = HashMap::new();
        if let Some(c) = derived {
            inferred.insert("f".to_string(), c);
        }

        let condition = Condition::new("f", op, target);
        let (matched, confidence) = evaluate(&condition, &values, &inferred).as_pair();
        prop_assert!((0.0..=1.0).contains(&confidence));
        if !matched {
            prop_assert_eq!(confidence, 0.0);
        }
    }
}

// ── Forward chaining ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn chained_confidences_stay_bounded_and_rules_fire_once(
        strengths in proptest::collection::vec(0.0f64..=1.0, 1..12),
    ) {
        // Every rule concludes the next link of a chain, and all also reinforce `sink`
        let mut rules = Vec::new();
        for (i, strength) in strengths.iter().enumerate() {
            rules.push(Rule::new(
                format!("L{}", i),
                vec![Condition::is_true(format!("f{}", i))],
                format!("f{}", i + 1),
                *strength,
            ));
            rules.push(Rule::new(
                format!("S{}", i),
                vec![Condition::is_true(format!("f{}", i))],
                "sink",
                *strength,
            ));
        }

        let mut session = Session::new(RuleSet::new(rules).unwrap().shared());
        let mut seed = HashMap::new();
        seed.insert("f0".to_string(), FactValue::Bool(true));
        session.load_data(&seed);
        let report = session.forward_chain();

        prop_assert!(report.converged);
        prop_assert_eq!(report.rules_fired, session.fired_rules().len());
        for confidence in session.inferred_facts().values() {
            prop_assert!((0.0..=1.0).contains(confidence));
        }
        prop_assert_eq!(session.forward_chain().rules_fired, 0);
    }
}
