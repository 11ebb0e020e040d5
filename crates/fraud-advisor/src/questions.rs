//! Question Selector
//!
//! Ranks outstanding clarifying questions by how much an answer is expected
//! to move the decision.

use crate::catalog::QuestionCatalog;
use crate::config::DecisionThresholds;
use crate::facts::{
    AMOUNT, LOCATION_EXPLAINED, LOCATION_MISMATCH, RECENT_ADDRESS_CHANGE,
    SHIPPING_ADDRESS_CHANGED_RECENTLY, USER_CONFIRMED_TRAVEL, VERIFICATION_QUESTIONS,
};
use crate::recommendation::recommendations;
use crate::risk::{has_explainable_anomalies, RiskProfile};
use rule_engine::{FactValue, Session};
use serde::{Deserialize, Serialize};
use tracing::debug;

const LOCATION_PRIORITY: f64 = 1.00;
const ADDRESS_PRIORITY: f64 = 0.90;
/// Follow-up priority per unit of indicator confidence
const FOLLOW_UP_FACTOR: f64 = 0.80;
const VERIFICATION_PRIORITY: f64 = 0.65;
const CLOSE_DECISION_PRIORITY: f64 = 0.70;
const DISAMBIGUATION_BOOST: f64 = 1.2;

/// A question worth asking, with its priority and the reason it was raised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionCandidate {
    pub fact: String,
    pub priority: f64,
    pub reason: String,
}

/// Insertion-ordered candidate queue, one entry per fact
#[derive(Default)]
struct Queue {
    candidates: Vec<QuestionCandidate>,
}

impl Queue {
    fn contains(&self, fact: &str) -> bool {
        self.candidates.iter().any(|c| c.fact == fact)
    }

    fn get_mut(&mut self, fact: &str) -> Option<&mut QuestionCandidate> {
        self.candidates.iter_mut().find(|c| c.fact == fact)
    }

    fn offer(&mut self, fact: &str, priority: f64, reason: impl Into<String>) {
        if self.contains(fact) {
            return;
        }
        let reason = reason.into();
        debug!("Question candidate {} ({:.2}): {}", fact, priority, reason);
        self.candidates.push(QuestionCandidate {
            fact: fact.to_string(),
            priority,
            reason,
        });
    }

    /// Highest priority first; ties keep insertion order
    fn into_ranked(mut self) -> Vec<QuestionCandidate> {
        self.candidates.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        self.candidates
    }
}

/// Rank the unasked questions relevant to the current state of `session`
pub fn relevant_questions(
    session: &Session,
    profile: &RiskProfile,
    thresholds: &DecisionThresholds,
    catalog: &QuestionCatalog,
) -> Vec<QuestionCandidate> {
    let active = profile.active_indicators(session);
    let risk = profile.risk_level(session);
    let mut queue = Queue::default();

    if active.contains(&LOCATION_MISMATCH)
        && !session.is_derived(LOCATION_EXPLAINED)
        && !session.was_asked(USER_CONFIRMED_TRAVEL)
    {
        queue.offer(USER_CONFIRMED_TRAVEL, LOCATION_PRIORITY, "Explain location anomaly");
    }

    if active.contains(&RECENT_ADDRESS_CHANGE)
        && !session.was_asked(SHIPPING_ADDRESS_CHANGED_RECENTLY)
    {
        queue.offer(
            SHIPPING_ADDRESS_CHANGED_RECENTLY,
            ADDRESS_PRIORITY,
            "Confirm address change",
        );
    }

    if risk < thresholds.low_risk && !has_explainable_anomalies(session) {
        return queue.into_ranked();
    }

    for indicator in &active {
        for question in profile.follow_ups_for(indicator) {
            if !catalog.contains(question) || session.was_asked(question) {
                continue;
            }
            let confidence = session.confidence(indicator).unwrap_or(0.5);
            queue.offer(
                question,
                confidence * FOLLOW_UP_FACTOR,
                format!("Address {}", indicator),
            );
        }
    }

    let amount = session
        .value(AMOUNT)
        .and_then(FactValue::as_f64)
        .unwrap_or(0.0);
    if risk > thresholds.high_risk || amount > thresholds.high_amount {
        for question in VERIFICATION_QUESTIONS {
            if !session.was_asked(question) {
                queue.offer(question, VERIFICATION_PRIORITY, "High-risk verification");
            }
        }
    }

    let recs = recommendations(session, profile, thresholds);
    if let [top, second, ..] = recs.as_slice() {
        if (top.confidence - second.confidence).abs() < thresholds.close_decision_margin {
            for question in VERIFICATION_QUESTIONS {
                if session.was_asked(question) {
                    continue;
                }
                match queue.get_mut(question) {
                    Some(candidate) => {
                        candidate.priority *= DISAMBIGUATION_BOOST;
                        candidate.reason.push_str(" + disambiguate");
                    }
                    None => queue.offer(question, CLOSE_DECISION_PRIORITY, "Close decision"),
                }
            }
        }
    }

    queue.into_ranked()
}
