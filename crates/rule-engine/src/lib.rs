//! Forward-Chaining Rule Engine
//!
//! Infers derived facts from directly supplied ones:
//! - Condition evaluation against mixed direct/derived facts
//! - Weakest-link premise confidence and probabilistic-OR reinforcement
//! - Fixpoint iteration where every rule fires at most once
//!
//! The engine is domain-agnostic; rule tables are supplied by the caller.

mod confidence;
mod evaluator;
mod fact;
mod rule;
mod session;
mod trace;

pub use confidence::{clamp_confidence, combine, MAX_CONFIDENCE, MIN_CONFIDENCE};
pub use evaluator::{evaluate, Evaluation};
pub use fact::{FactValue, Facts};
pub use rule::{Condition, Operator, Rule, RuleSet};
pub use session::{ChainReport, Session};
pub use trace::TraceEntry;

use thiserror::Error;

/// Errors raised while building or loading a rule table
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Duplicate rule id: {0}")]
    DuplicateRuleId(String),

    #[error("Rule id must not be empty")]
    EmptyRuleId,

    #[error("Rule {0} has an empty conclusion")]
    EmptyConclusion(String),

    #[error("Rule {rule_id} strength {strength} is outside [0, 1]")]
    InvalidStrength { rule_id: String, strength: f64 },

    #[error("Unknown operator: {0:?}")]
    UnknownOperator(String),

    #[error("Rule table parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}
