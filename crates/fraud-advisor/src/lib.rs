//! Fraud Advisor
//!
//! Fraud-risk expert system built on the forward-chaining rule engine:
//! - Built-in rule, question and default-fill catalog
//! - Severity-tiered risk scoring
//! - Clarifying-question prioritization
//! - Recommendation resolution and the stop-asking heuristic

mod advisor;
mod catalog;
mod config;
pub mod facts;
mod questions;
mod recommendation;
mod risk;

pub use advisor::FraudAdvisor;
pub use catalog::{default_facts, fraud_rules, FraudCatalog, QuestionCatalog};
pub use self::config::{AdvisorConfig, DecisionThresholds};
pub use facts::Action;
pub use questions::{relevant_questions, QuestionCandidate};
pub use recommendation::{recommendations, should_continue_asking, Recommendation};
pub use risk::{has_explainable_anomalies, RiskProfile, Severity, SeverityTier};

use rule_engine::RuleError;
use thiserror::Error;

/// Fraud advisor error types
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Rule table error: {0}")]
    Rules(#[from] RuleError),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid risk profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid decision threshold: {0}")]
    InvalidThreshold(String),
}
