//! Built-in fraud catalog: rule table, question prompts and default inputs
//!
//! Rule ids follow four layers:
//! - `O*` observations over raw transaction attributes
//! - `T*` threat patterns combining observations
//! - `C*` clarifications established by answers
//! - `D*` decisions

use crate::facts::{
    DEVICE_SEEN_BEFORE, OTP_PASSED, SHIPPING_ADDRESS_CHANGED_RECENTLY, USER_CONFIRMED_TRANSACTION,
    USER_CONFIRMED_TRAVEL,
};
use crate::AdvisorError;
use rule_engine::{Condition, FactValue, Facts, Operator, Rule, RuleSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

fn observe(id: &str, condition: Condition, conclusion: &str, strength: f64) -> Rule {
    Rule::new(id, vec![condition], conclusion, strength)
}

fn when_all(id: &str, facts: &[&str], conclusion: &str, strength: f64) -> Rule {
    let conditions = facts.iter().map(|f| Condition::is_true(*f)).collect();
    Rule::new(id, conditions, conclusion, strength)
}

/// The fraud rule table
pub fn fraud_rules() -> Vec<Rule> {
    use Operator::{Ge, Gt, Lt};

    vec![
        observe("O1", Condition::new("amount", Gt, 500), "high_amount", 0.60),
        observe("O2", Condition::new("amount", Gt, 1500), "very_high_amount", 0.80),
        observe("O3", Condition::new("account_age_days", Lt, 7), "new_account", 0.80),
        observe("O4", Condition::new("account_age_days", Lt, 30), "young_account", 0.50),
        observe(
            "O5",
            Condition::new("failed_logins_24h", Ge, 3),
            "suspicious_login_activity",
            0.70,
        ),
        observe("O6", Condition::new("failed_logins_24h", Ge, 8), "many_failed_logins", 0.85),
        observe("O7", Condition::new("transactions_last_hour", Ge, 3), "high_velocity", 0.70),
        observe("O8", Condition::new("transactions_last_hour", Ge, 6), "very_high_velocity", 0.85),
        observe("O9", Condition::new(DEVICE_SEEN_BEFORE, Operator::Eq, false), "new_device", 0.70),
        observe(
            "O10",
            Condition::new(DEVICE_SEEN_BEFORE, Operator::Eq, true),
            "known_device",
            0.60,
        ),
        observe("O11", Condition::new("ip_risk_score", Ge, 80), "high_ip_risk", 0.90),
        observe("O12", Condition::new("ip_risk_score", Ge, 50), "medium_ip_risk", 0.60),
        observe("O13", Condition::is_true("country_mismatch"), "location_mismatch", 0.70),
        observe(
            "O14",
            Condition::is_true("billing_shipping_mismatch"),
            "billing_shipping_mismatch_flag",
            0.75,
        ),
        observe(
            "O15",
            Condition::is_true(SHIPPING_ADDRESS_CHANGED_RECENTLY),
            "recent_address_change",
            0.65,
        ),
        observe("O16", Condition::new("email_age_days", Lt, 30), "new_email", 0.55),
        observe(
            "O17",
            Condition::new("phone_verified", Operator::Eq, false),
            "unverified_phone",
            0.60,
        ),
        observe("O18", Condition::is_true("vpn_detected"), "anonymous_connection", 0.65),
        when_all("T1", &["location_mismatch", "new_device"], "account_takeover_risk", 0.75)
            .with_description("Unfamiliar device from an unexpected country"),
        when_all("T2", &["suspicious_login_activity", "new_device"], "account_takeover_risk", 0.80)
            .with_description("Failed logins followed by a new device"),
        when_all("T3", &["many_failed_logins"], "account_takeover_risk", 0.70),
        when_all(
            "T4",
            &["billing_shipping_mismatch_flag", "high_amount"],
            "payment_fraud_risk",
            0.75,
        ),
        when_all("T5", &["high_ip_risk", "anonymous_connection"], "payment_fraud_risk", 0.70),
        when_all("T6", &["location_mismatch", "high_amount"], "payment_fraud_risk", 0.60),
        when_all("T7", &["new_account", "unverified_phone"], "fake_account_risk", 0.75),
        when_all("T8", &["new_email", "unverified_phone"], "fake_account_risk", 0.70),
        when_all("T9", &["young_account", "high_velocity"], "fake_account_risk", 0.60),
        when_all("T10", &["very_high_velocity"], "automation_risk", 0.80),
        when_all("T11", &["high_velocity", "medium_ip_risk"], "automation_risk", 0.65),
        when_all(
            "T12",
            &["recent_address_change", "location_mismatch"],
            "suspicious_delivery_risk",
            0.70,
        ),
        when_all("T13", &["suspicious_delivery_risk", "high_amount"], "reshipping_risk", 0.70)
            .with_description("Redirected delivery of a large order"),
        when_all("C1", &[USER_CONFIRMED_TRANSACTION], "legitimate_user", 0.90),
        when_all("C2", &[OTP_PASSED], "legitimate_user", 0.95),
        when_all("C3", &[USER_CONFIRMED_TRAVEL], "expected_location_change", 0.90),
        when_all(
            "C4",
            &["location_mismatch", "expected_location_change"],
            "location_explained",
            0.95,
        ),
        when_all("C5", &["known_device"], "trusted_device", 0.60),
        Rule::new(
            "C6",
            vec![
                Condition::new("account_age_days", Gt, 180),
                Condition::new("past_chargebacks", Operator::Eq, 0),
            ],
            "trusted_history",
            0.70,
        )
        .with_description("Established account without chargebacks"),
        when_all("D1", &["account_takeover_risk", "very_high_amount"], "DECLINE_recommended", 0.85),
        when_all("D2", &["account_takeover_risk"], "STEP_UP_VERIFY_recommended", 0.70),
        when_all("D3", &["payment_fraud_risk", "high_amount"], "MANUAL_REVIEW_recommended", 0.70),
        when_all("D4", &["fake_account_risk", "high_amount"], "MANUAL_REVIEW_recommended", 0.75),
        when_all("D5", &["automation_risk"], "DECLINE_recommended", 0.85),
        when_all("D6", &["reshipping_risk"], "MANUAL_REVIEW_recommended", 0.75),
        when_all("D7", &["high_ip_risk", "very_high_amount"], "STEP_UP_VERIFY_recommended", 0.60),
        when_all("D8", &["legitimate_user"], "APPROVE_recommended", 0.95),
        when_all("D9", &["location_explained"], "APPROVE_recommended", 0.85),
        when_all("D10", &["trusted_history"], "APPROVE_recommended", 0.60),
    ]
}

/// Inputs filled in when a transaction does not supply them
pub fn default_facts() -> Facts {
    let mut facts = Facts::new();
    facts.insert("email_age_days".to_string(), FactValue::Int(180));
    facts.insert("vpn_detected".to_string(), FactValue::Bool(false));
    facts.insert(SHIPPING_ADDRESS_CHANGED_RECENTLY.to_string(), FactValue::Bool(false));
    facts.insert("past_chargebacks".to_string(), FactValue::Int(0));
    facts
}

/// Known question facts and their prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionCatalog {
    prompts: BTreeMap<String, String>,
}

impl QuestionCatalog {
    pub fn new(prompts: BTreeMap<String, String>) -> Self {
        Self { prompts }
    }

    pub fn contains(&self, fact: &str) -> bool {
        self.prompts.contains_key(fact)
    }

    pub fn prompt(&self, fact: &str) -> Option<&str> {
        self.prompts.get(fact).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        let prompts = [
            (USER_CONFIRMED_TRANSACTION, "Was this transaction made by you? (yes/no)"),
            (OTP_PASSED, "Did the OTP/3DS verification succeed? (yes/no)"),
            (USER_CONFIRMED_TRAVEL, "Are you currently traveling? (yes/no)"),
            (SHIPPING_ADDRESS_CHANGED_RECENTLY, "Is this shipping address new for you? (yes/no)"),
            (DEVICE_SEEN_BEFORE, "Have you used this device before? (yes/no)"),
        ];
        Self::new(
            prompts
                .into_iter()
                .map(|(fact, prompt)| (fact.to_string(), prompt.to_string()))
                .collect(),
        )
    }
}

/// Static configuration shared by every advisory session
#[derive(Debug, Clone)]
pub struct FraudCatalog {
    pub rules: Arc<RuleSet>,
    pub questions: QuestionCatalog,
    pub defaults: Facts,
}

impl FraudCatalog {
    /// The built-in fraud rule table, prompts and defaults
    pub fn builtin() -> Result<Self, AdvisorError> {
        Ok(Self::with_rules(RuleSet::new(fraud_rules())?))
    }

    /// Built-in prompts and defaults over a caller-supplied rule table
    pub fn with_rules(rules: RuleSet) -> Self {
        info!("Fraud catalog: {} rules", rules.len());
        let questions = QuestionCatalog::default();
        Self {
            rules: rules.shared(),
            questions,
            defaults: default_facts(),
        }
    }
}
