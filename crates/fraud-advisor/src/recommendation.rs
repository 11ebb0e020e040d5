//! Recommendation Resolver

use crate::config::DecisionThresholds;
use crate::facts::Action;
use crate::risk::{has_explainable_anomalies, RiskProfile};
use rule_engine::Session;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default recommendations when no decision rule fired
const CLEAN_APPROVAL: f64 = 0.92;
const MODERATE_APPROVAL: f64 = 0.70;
const FALLBACK_STEP_UP: f64 = 0.55;

/// A decision action with its confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub confidence: f64,
    /// True when derived from the risk level rather than from a fired rule
    pub synthesized: bool,
}

/// Current recommendations, highest confidence first.
///
/// Uses every derived decision fact; when the rules produced none, falls back
/// to a single recommendation chosen by the overall risk level.
pub fn recommendations(
    session: &Session,
    profile: &RiskProfile,
    thresholds: &DecisionThresholds,
) -> Vec<Recommendation> {
    let mut results: Vec<Recommendation> = Action::ALL
        .into_iter()
        .filter_map(|action| {
            session.confidence(action.fact()).map(|confidence| Recommendation {
                action,
                confidence,
                synthesized: false,
            })
        })
        .collect();

    if results.is_empty() {
        let risk = profile.risk_level(session);
        let (action, confidence) = if risk < thresholds.low_risk {
            (Action::Approve, CLEAN_APPROVAL)
        } else if risk < thresholds.moderate_risk {
            (Action::Approve, MODERATE_APPROVAL)
        } else {
            (Action::StepUpVerify, FALLBACK_STEP_UP)
        };
        debug!("No decision derived; risk {:.2} defaults to {} ({:.2})", risk, action, confidence);
        results.push(Recommendation {
            action,
            confidence,
            synthesized: true,
        });
    }

    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    results
}

/// Whether another clarifying question is worth asking.
///
/// Unresolved anomalies always keep the questioning going; otherwise a
/// sufficiently confident top recommendation ends it, and an ambiguous or
/// unconvincing one on a risky case continues it.
pub fn should_continue_asking(
    session: &Session,
    profile: &RiskProfile,
    thresholds: &DecisionThresholds,
) -> bool {
    let recs = recommendations(session, profile, thresholds);
    let Some(top) = recs.first() else {
        return false;
    };
    let risk = profile.risk_level(session);

    if has_explainable_anomalies(session) {
        return true;
    }

    if top.confidence >= thresholds.settled_confidence {
        return false;
    }

    if risk < thresholds.low_risk && top.confidence >= thresholds.assured_confidence {
        return false;
    }

    if top.confidence >= thresholds.adverse_confidence && top.action.is_adverse() {
        return false;
    }

    if let Some(second) = recs.get(1) {
        if top.confidence - second.confidence < thresholds.ambiguity_margin {
            return true;
        }
    }

    risk > thresholds.elevated_risk && top.confidence < thresholds.assured_confidence
}
