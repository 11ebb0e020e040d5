use fraud_advisor::{FraudAdvisor, RiskProfile};
use proptest::prelude::*;
use rule_engine::{FactValue, Facts};

fn transaction() -> impl Strategy<Value = Facts> {
    (
        0i64..5000,
        0i64..1000,
        0i64..100,
        0i64..12,
        0i64..10,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(amount, age, ip, logins, velocity, country, device, phone, billing)| {
                [
                    ("amount", FactValue::Int(amount)),
                    ("account_age_days", FactValue::Int(age)),
                    ("ip_risk_score", FactValue::Int(ip)),
                    ("failed_logins_24h", FactValue::Int(logins)),
                    ("transactions_last_hour", FactValue::Int(velocity)),
                    ("country_mismatch", FactValue::Bool(country)),
                    ("device_seen_before", FactValue::Bool(device)),
                    ("phone_verified", FactValue::Bool(phone)),
                    ("billing_shipping_mismatch", FactValue::Bool(billing)),
                ]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect()
            },
        )
}

proptest! {
    #[test]
    fn assessment_stays_well_formed(facts in transaction()) {
        let mut advisor = FraudAdvisor::builtin().unwrap();
        advisor.load_data(&facts);
        let report = advisor.forward_chain();
        prop_assert!(report.converged);

        let risk = advisor.risk_level();
        prop_assert!((0.0..=1.0).contains(&risk));

        let recs = advisor.recommendations();
        prop_assert!(!recs.is_empty());
        prop_assert!(recs.windows(2).all(|w| w[0].confidence >= w[1].confidence));

        let questions = advisor.relevant_questions();
        prop_assert!(questions.windows(2).all(|w| w[0].priority >= w[1].priority));
        let mut seen: Vec<&str> = questions.iter().map(|q| q.fact.as_str()).collect();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), questions.len());
    }

    #[test]
    fn answered_questions_never_resurface(facts in transaction(), answer in any::<bool>()) {
        let mut advisor = FraudAdvisor::builtin().unwrap();
        advisor.load_data(&facts);
        advisor.forward_chain();

        if let Some(top) = advisor.relevant_questions().first().cloned() {
            advisor.mark_asked(&top.fact);
            let mut reply = Facts::new();
            reply.insert(top.fact.clone(), FactValue::Bool(answer));
            advisor.load_data(&reply);
            advisor.forward_chain();

            prop_assert!(advisor.relevant_questions().iter().all(|q| q.fact != top.fact));
        }
    }

    #[test]
    fn more_indicators_never_lower_risk(extra in 0.51f64..=1.0) {
        let profile = RiskProfile::default();
        let mut advisor = FraudAdvisor::builtin().unwrap();
        advisor.session_mut().seed_inferred("high_amount", 0.6);
        let before = profile.risk_level(advisor.session());

        advisor.session_mut().seed_inferred("new_email", extra);
        let after = profile.risk_level(advisor.session());
        prop_assert!(after >= before);
    }
}
