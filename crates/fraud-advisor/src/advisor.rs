//! Fraud advisory session

use crate::catalog::{FraudCatalog, QuestionCatalog};
use crate::config::AdvisorConfig;
use crate::questions::{relevant_questions, QuestionCandidate};
use crate::recommendation::{recommendations, should_continue_asking, Recommendation};
use crate::risk::has_explainable_anomalies;
use crate::AdvisorError;
use rule_engine::{ChainReport, Facts, Session, TraceEntry};
use tracing::info;

/// One advisory run over a transaction.
///
/// Wraps an inference session together with the catalog and configuration
/// it is judged by. Each instance owns its state; concurrent runs use
/// separate advisors over the same shared catalog.
pub struct FraudAdvisor {
    session: Session,
    questions: QuestionCatalog,
    config: AdvisorConfig,
}

impl FraudAdvisor {
    /// Create an advisor over a catalog
    pub fn new(catalog: &FraudCatalog, config: AdvisorConfig) -> Self {
        info!(
            "Creating fraud advisor: {} rules, {} questions",
            catalog.rules.len(),
            catalog.questions.len()
        );
        Self {
            session: Session::new(catalog.rules.clone()).with_defaults(catalog.defaults.clone()),
            questions: catalog.questions.clone(),
            config,
        }
    }

    /// Advisor over the built-in catalog and default configuration
    pub fn builtin() -> Result<Self, AdvisorError> {
        Ok(Self::new(&FraudCatalog::builtin()?, AdvisorConfig::default()))
    }

    /// Merge transaction facts or answers
    pub fn load_data(&mut self, facts: &Facts) {
        self.session.load_data(facts);
    }

    /// Run forward chaining to a fixpoint
    pub fn forward_chain(&mut self) -> ChainReport {
        self.session.forward_chain()
    }

    pub fn active_risk_indicators(&self) -> Vec<&str> {
        self.config.risk.active_indicators(&self.session)
    }

    pub fn risk_level(&self) -> f64 {
        self.config.risk.risk_level(&self.session)
    }

    pub fn has_explainable_anomalies(&self) -> bool {
        has_explainable_anomalies(&self.session)
    }

    pub fn recommendations(&self) -> Vec<Recommendation> {
        recommendations(&self.session, &self.config.risk, &self.config.thresholds)
    }

    pub fn relevant_questions(&self) -> Vec<QuestionCandidate> {
        relevant_questions(
            &self.session,
            &self.config.risk,
            &self.config.thresholds,
            &self.questions,
        )
    }

    pub fn should_continue_asking(&self) -> bool {
        should_continue_asking(&self.session, &self.config.risk, &self.config.thresholds)
    }

    /// Record that the user was asked about `fact`
    pub fn mark_asked(&mut self, fact: &str) {
        self.session.mark_asked(fact);
    }

    pub fn prompt(&self, fact: &str) -> Option<&str> {
        self.questions.prompt(fact)
    }

    pub fn trace(&self) -> &[TraceEntry] {
        self.session.trace()
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}
