//! Rules and Rule Sets

use crate::fact::FactValue;
use crate::RuleError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl Operator {
    /// Get symbol representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Eq => "==",
            Operator::Ne => "!=",
        }
    }

    /// Whether an ordering between the fact value and the target satisfies this operator
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Ge => ordering != Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
        }
    }
}

impl FromStr for Operator {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Operator::Gt),
            "<" => Ok(Operator::Lt),
            ">=" => Ok(Operator::Ge),
            "<=" => Ok(Operator::Le),
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            other => Err(RuleError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `(fact, operator, target)` premise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub fact: String,
    pub op: Operator,
    pub target: FactValue,
}

impl Condition {
    pub fn new(fact: impl Into<String>, op: Operator, target: impl Into<FactValue>) -> Self {
        Self {
            fact: fact.into(),
            op,
            target: target.into(),
        }
    }

    /// Shorthand for `fact == true`
    pub fn is_true(fact: impl Into<String>) -> Self {
        Self::new(fact, Operator::Eq, true)
    }

    /// Build a condition from a textual operator symbol
    pub fn parse(
        fact: impl Into<String>,
        op: &str,
        target: impl Into<FactValue>,
    ) -> Result<Self, RuleError> {
        Ok(Self::new(fact, op.parse()?, target))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.fact, self.op, self.target)
    }
}

/// Implication: all conditions hold ⇒ conclusion, weighted by strength
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub conditions: Vec<Condition>,
    pub conclusion: String,
    pub strength: f64,
    #[serde(default)]
    pub description: String,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        conditions: Vec<Condition>,
        conclusion: impl Into<String>,
        strength: f64,
    ) -> Self {
        Self {
            id: id.into(),
            conditions,
            conclusion: conclusion.into(),
            strength,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.id, self.conclusion, self.strength)
    }
}

/// Validated, immutable rule table.
///
/// Shared read-only between sessions through an [`Arc`]; nothing in the
/// engine ever writes to it after construction.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Validate and freeze a rule table
    pub fn new(rules: Vec<Rule>) -> Result<Self, RuleError> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if rule.id.is_empty() {
                return Err(RuleError::EmptyRuleId);
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(RuleError::DuplicateRuleId(rule.id.clone()));
            }
            if rule.conclusion.is_empty() {
                return Err(RuleError::EmptyConclusion(rule.id.clone()));
            }
            if !rule.strength.is_finite() || !(0.0..=1.0).contains(&rule.strength) {
                return Err(RuleError::InvalidStrength {
                    rule_id: rule.id.clone(),
                    strength: rule.strength,
                });
            }
        }

        info!("Rule set loaded: {} rules", rules.len());
        Ok(Self { rules })
    }

    /// Parse a JSON array of rules
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let rules: Vec<Rule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    /// Freeze into a shareable handle
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
