//! Reasoning trace

use serde::{Deserialize, Serialize};
use std::fmt;

/// One firing or update event, in the order it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceEntry {
    /// A rule established a conclusion for the first time
    Fired {
        rule_id: String,
        conclusion: String,
        confidence: f64,
    },
    /// A rule reinforced an already derived conclusion
    Updated {
        rule_id: String,
        conclusion: String,
        previous: f64,
        current: f64,
    },
}

impl TraceEntry {
    pub fn rule_id(&self) -> &str {
        match self {
            TraceEntry::Fired { rule_id, .. } | TraceEntry::Updated { rule_id, .. } => rule_id,
        }
    }

    pub fn conclusion(&self) -> &str {
        match self {
            TraceEntry::Fired { conclusion, .. } | TraceEntry::Updated { conclusion, .. } => {
                conclusion
            }
        }
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEntry::Fired {
                rule_id,
                conclusion,
                confidence,
            } => write!(f, "Fired {}: '{}' = {:.2}", rule_id, conclusion, confidence),
            TraceEntry::Updated {
                rule_id,
                conclusion,
                previous,
                current,
            } => write!(
                f,
                "Updated '{}': {:.2} -> {:.2} via {}",
                conclusion, previous, current, rule_id
            ),
        }
    }
}
