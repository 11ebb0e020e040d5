//! Risk Aggregator
//!
//! Classifies derived facts by severity tier and folds them into a bounded
//! overall risk score.

use crate::facts::{
    DEVICE_SEEN_BEFORE, LOCATION_EXPLAINED, LOCATION_MISMATCH, NEW_DEVICE, RECENT_ADDRESS_CHANGE,
    SHIPPING_ADDRESS_CHANGED_RECENTLY, USER_CONFIRMED_TRANSACTION,
};
use crate::AdvisorError;
use rule_engine::Session;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Indicator severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Weight applied to every indicator of one severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityTier {
    pub severity: Severity,
    pub weight: f64,
    pub facts: Vec<String>,
}

/// Which derived facts count as risk, and how much
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Risk-relevant facts, in reporting order
    pub indicators: Vec<String>,
    /// Severity tiers, searched in order
    pub tiers: Vec<SeverityTier>,
    /// Derived confidence an indicator must exceed to be active (default: 0.5)
    pub activation_threshold: f64,
    /// Follow-up questions that can clear an active indicator
    pub follow_ups: BTreeMap<String, Vec<String>>,
}

fn names(facts: &[&str]) -> Vec<String> {
    facts.iter().map(|f| f.to_string()).collect()
}

impl Default for RiskProfile {
    fn default() -> Self {
        let mut follow_ups = BTreeMap::new();
        follow_ups.insert(
            NEW_DEVICE.to_string(),
            names(&[DEVICE_SEEN_BEFORE, USER_CONFIRMED_TRANSACTION]),
        );

        Self {
            indicators: names(&[
                NEW_DEVICE,
                LOCATION_MISMATCH,
                "high_amount",
                "very_high_amount",
                "suspicious_login_activity",
                "many_failed_logins",
                "high_velocity",
                "very_high_velocity",
                "high_ip_risk",
                "medium_ip_risk",
                "billing_shipping_mismatch_flag",
                RECENT_ADDRESS_CHANGE,
                "new_account",
                "young_account",
                "unverified_phone",
                "new_email",
                "anonymous_connection",
            ]),
            tiers: vec![
                SeverityTier {
                    severity: Severity::High,
                    weight: 0.35,
                    facts: names(&[
                        "high_ip_risk",
                        "many_failed_logins",
                        "very_high_velocity",
                        "very_high_amount",
                        "anonymous_connection",
                    ]),
                },
                SeverityTier {
                    severity: Severity::Medium,
                    weight: 0.20,
                    facts: names(&[
                        LOCATION_MISMATCH,
                        NEW_DEVICE,
                        "suspicious_login_activity",
                        "high_amount",
                        "billing_shipping_mismatch_flag",
                        RECENT_ADDRESS_CHANGE,
                        "high_velocity",
                    ]),
                },
                SeverityTier {
                    severity: Severity::Low,
                    weight: 0.10,
                    facts: names(&[
                        "medium_ip_risk",
                        "new_account",
                        "young_account",
                        "unverified_phone",
                        "new_email",
                    ]),
                },
            ],
            activation_threshold: 0.5,
            follow_ups,
        }
    }
}

impl RiskProfile {
    /// Reject weights and thresholds outside [0, 1]
    pub fn validate(&self) -> Result<(), AdvisorError> {
        if !(0.0..=1.0).contains(&self.activation_threshold) {
            return Err(AdvisorError::InvalidProfile(format!(
                "activation threshold {} outside [0, 1]",
                self.activation_threshold
            )));
        }
        for tier in &self.tiers {
            if !(0.0..=1.0).contains(&tier.weight) {
                return Err(AdvisorError::InvalidProfile(format!(
                    "{:?} tier weight {} outside [0, 1]",
                    tier.severity, tier.weight
                )));
            }
        }
        Ok(())
    }

    /// First tier listing `fact`
    pub fn tier_of(&self, fact: &str) -> Option<&SeverityTier> {
        self.tiers.iter().find(|t| t.facts.iter().any(|f| f == fact))
    }

    /// Indicators whose derived confidence exceeds the activation threshold, in declared order
    pub fn active_indicators<'a>(&'a self, session: &Session) -> Vec<&'a str> {
        self.indicators
            .iter()
            .filter(|fact| {
                session.confidence(fact).unwrap_or(0.0) > self.activation_threshold
            })
            .map(String::as_str)
            .collect()
    }

    /// Additive tier-weighted score of the active indicators, capped at 1.0
    pub fn risk_level(&self, session: &Session) -> f64 {
        let score: f64 = self
            .active_indicators(session)
            .into_iter()
            .filter_map(|fact| {
                let tier = self.tier_of(fact)?;
                Some(session.confidence(fact).unwrap_or(0.0) * tier.weight)
            })
            .sum();
        score.min(1.0)
    }

    pub fn follow_ups_for(&self, indicator: &str) -> &[String] {
        self.follow_ups
            .get(indicator)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Unresolved context that warrants asking regardless of the numeric risk:
/// an unexplained location mismatch, or an address change not yet confirmed.
pub fn has_explainable_anomalies(session: &Session) -> bool {
    if session.is_derived(LOCATION_MISMATCH) && !session.is_derived(LOCATION_EXPLAINED) {
        return true;
    }
    session.is_derived(RECENT_ADDRESS_CHANGE)
        && !session.was_asked(SHIPPING_ADDRESS_CHANGED_RECENTLY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rule_engine::RuleSet;

    fn session_with(inferred: &[(&str, f64)]) -> Session {
        let mut session = Session::new(RuleSet::new(vec![]).unwrap().shared());
        for (fact, confidence) in inferred {
            session.seed_inferred(*fact, *confidence);
        }
        session
    }

    #[test]
    fn test_active_indicators_in_declared_order() {
        let profile = RiskProfile::default();
        let session = session_with(&[
            ("anonymous_connection", 0.65),
            ("high_amount", 0.6),
            ("new_device", 0.9),
            ("young_account", 0.5),
        ]);

        assert_eq!(
            profile.active_indicators(&session),
            vec!["new_device", "high_amount", "anonymous_connection"]
        );
    }

    #[test]
    fn test_risk_level_weights() {
        let profile = RiskProfile::default();
        let session = session_with(&[
            ("very_high_amount", 0.8),
            ("high_amount", 0.6),
            ("new_email", 0.55),
        ]);

        let expected = 0.8 * 0.35 + 0.6 * 0.20 + 0.55 * 0.10;
        assert!((profile.risk_level(&session) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_risk_level_capped() {
        let profile = RiskProfile::default();
        let session = session_with(&[
            ("high_ip_risk", 1.0),
            ("many_failed_logins", 1.0),
            ("very_high_velocity", 1.0),
            ("very_high_amount", 1.0),
        ]);
        assert_eq!(profile.risk_level(&session), 1.0);
    }

    #[test]
    fn test_untiered_indicator_contributes_nothing() {
        let mut profile = RiskProfile::default();
        profile.indicators.push("odd_signal".to_string());
        let session = session_with(&[("odd_signal", 0.9)]);

        assert_eq!(profile.active_indicators(&session), vec!["odd_signal"]);
        assert_eq!(profile.risk_level(&session), 0.0);
    }

    #[test]
    fn test_substituted_profile() {
        let profile = RiskProfile {
            indicators: vec!["x".to_string()],
            tiers: vec![SeverityTier {
                severity: Severity::High,
                weight: 0.5,
                facts: vec!["x".to_string()],
            }],
            activation_threshold: 0.1,
            follow_ups: BTreeMap::new(),
        };
        let session = session_with(&[("x", 0.2)]);
        assert!((profile.risk_level(&session) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_validate() {
        assert!(RiskProfile::default().validate().is_ok());

        let mut profile = RiskProfile::default();
        profile.tiers[0].weight = 1.5;
        assert!(matches!(profile.validate(), Err(AdvisorError::InvalidProfile(_))));
    }

    #[test]
    fn test_explainable_anomalies() {
        let session = session_with(&[("location_mismatch", 0.7)]);
        assert!(has_explainable_anomalies(&session));

        let session = session_with(&[("location_mismatch", 0.7), ("location_explained", 0.66)]);
        assert!(!has_explainable_anomalies(&session));

        let mut session = session_with(&[("recent_address_change", 0.65)]);
        assert!(has_explainable_anomalies(&session));
        session.mark_asked(SHIPPING_ADDRESS_CHANGED_RECENTLY);
        assert!(!has_explainable_anomalies(&session));
    }
}
