//! Advisor configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! file, then `FRAUD_ADVISOR__*` environment variables
//! (e.g. `FRAUD_ADVISOR__THRESHOLDS__HIGH_AMOUNT=2500`).

use crate::risk::RiskProfile;
use crate::AdvisorError;
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const ENV_PREFIX: &str = "FRAUD_ADVISOR";

/// Cut-offs used by question selection and the stop-asking heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    /// Risk below which a case is considered clean (default: 0.12)
    pub low_risk: f64,
    /// Risk below which the default recommendation is still approve (default: 0.30)
    pub moderate_risk: f64,
    /// Risk above which an unconvincing recommendation keeps the questioning going (default: 0.25)
    pub elevated_risk: f64,
    /// Risk above which cardholder verification is requested (default: 0.45)
    pub high_risk: f64,
    /// Amount above which cardholder verification is requested (default: 1500)
    pub high_amount: f64,
    /// Top confidence that settles any decision (default: 0.92)
    pub settled_confidence: f64,
    /// Top confidence that settles a low-risk decision (default: 0.80)
    pub assured_confidence: f64,
    /// Top confidence that settles a decline or manual review (default: 0.88)
    pub adverse_confidence: f64,
    /// Gap between the top two recommendations below which the decision is ambiguous (default: 0.15)
    pub ambiguity_margin: f64,
    /// Gap below which verification questions get boosted (default: 0.20)
    pub close_decision_margin: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            low_risk: 0.12,
            moderate_risk: 0.30,
            elevated_risk: 0.25,
            high_risk: 0.45,
            high_amount: 1500.0,
            settled_confidence: 0.92,
            assured_confidence: 0.80,
            adverse_confidence: 0.88,
            ambiguity_margin: 0.15,
            close_decision_margin: 0.20,
        }
    }
}

impl DecisionThresholds {
    /// Cut-offs must lie in [0, 1]; `high_amount` must be finite and non-negative
    pub fn validate(&self) -> Result<(), AdvisorError> {
        let cut_offs = [
            ("low_risk", self.low_risk),
            ("moderate_risk", self.moderate_risk),
            ("elevated_risk", self.elevated_risk),
            ("high_risk", self.high_risk),
            ("settled_confidence", self.settled_confidence),
            ("assured_confidence", self.assured_confidence),
            ("adverse_confidence", self.adverse_confidence),
            ("ambiguity_margin", self.ambiguity_margin),
            ("close_decision_margin", self.close_decision_margin),
        ];
        for (name, value) in cut_offs {
            if !(0.0..=1.0).contains(&value) {
                return Err(AdvisorError::InvalidThreshold(format!(
                    "{} = {} outside [0, 1]",
                    name, value
                )));
            }
        }
        if !self.high_amount.is_finite() || self.high_amount < 0.0 {
            return Err(AdvisorError::InvalidThreshold(format!(
                "high_amount = {} is not a finite non-negative amount",
                self.high_amount
            )));
        }
        Ok(())
    }
}

/// Advisor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub risk: RiskProfile,
    pub thresholds: DecisionThresholds,
    /// Questions asked per session before deciding anyway (default: 5)
    pub max_questions: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            risk: RiskProfile::default(),
            thresholds: DecisionThresholds::default(),
            max_questions: 5,
        }
    }
}

impl AdvisorConfig {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, AdvisorError> {
        Self::load_layers(path, None)
    }

    /// `env` replaces the process environment when given
    fn load_layers(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, AdvisorError> {
        let mut builder = Self::defaults_builder()?;
        if let Some(path) = path {
            info!("Loading advisor config from {}", path.display());
            builder = builder.add_source(File::from(path));
        }
        Self::finish(builder.add_source(Self::environment(env)))
    }

    /// Defaults overlaid with an in-memory TOML document
    pub fn from_toml(text: &str) -> Result<Self, AdvisorError> {
        let builder = Self::defaults_builder()?.add_source(File::from_str(text, FileFormat::Toml));
        Self::finish(builder)
    }

    fn defaults_builder() -> Result<ConfigBuilder<DefaultState>, AdvisorError> {
        Ok(Config::builder().add_source(Config::try_from(&AdvisorConfig::default())?))
    }

    fn environment(source: Option<Map<String, String>>) -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .source(source)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, AdvisorError> {
        let config: AdvisorConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AdvisorError> {
        self.risk.validate()?;
        self.thresholds.validate()
    }
}
