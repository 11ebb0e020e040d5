//! Inference Session and Forward Chaining

use crate::confidence::{clamp_confidence, combine, MAX_CONFIDENCE};
use crate::evaluator::evaluate;
use crate::fact::{FactValue, Facts};
use crate::rule::{Rule, RuleSet};
use crate::trace::TraceEntry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Minimum gain for a reinforcement to count as a change
const UPDATE_EPSILON: f64 = 1e-12;

/// Lower bound of the fixpoint iteration cap
const MIN_ITERATION_CAP: usize = 50;

/// Summary of one forward-chaining pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainReport {
    /// Fixpoint iterations executed
    pub iterations: usize,
    /// Rules fired during this pass
    pub rules_fired: usize,
    /// False only if the iteration cap stopped the pass while facts were still changing
    pub converged: bool,
}

/// State of one inference run.
///
/// Owns all mutable knowledge of the run; the rule table is shared
/// read-only. Supplied and derived facts are only ever added or raised,
/// never removed, and each rule fires at most once per session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Shared rule table
    rules: Arc<RuleSet>,
    /// Values filled in by `load_data` when absent
    defaults: Facts,
    /// Supplied facts, plus a `true` placeholder for every derived fact
    values: HashMap<String, FactValue>,
    /// Confidence of every derived fact
    inferred: HashMap<String, f64>,
    /// Ids of rules that already fired
    fired: HashSet<String>,
    /// Facts already solicited from the user
    asked: HashSet<String>,
    /// Firing/update log
    trace: Vec<TraceEntry>,
}

impl Session {
    /// Create an empty session over a shared rule table
    pub fn new(rules: Arc<RuleSet>) -> Self {
        debug!("Creating inference session over {} rules", rules.len());
        Self {
            rules,
            defaults: Facts::new(),
            values: HashMap::new(),
            inferred: HashMap::new(),
            fired: HashSet::new(),
            asked: HashSet::new(),
            trace: Vec::new(),
        }
    }

    /// Set the default-fill table applied by [`Session::load_data`]
    pub fn with_defaults(mut self, defaults: Facts) -> Self {
        self.defaults = defaults;
        self
    }

    /// Merge supplied facts into the session.
    ///
    /// Incoming keys overwrite earlier inputs. Defaults are filled in only for
    /// keys neither supplied now nor loaded before. The caller's map is only
    /// borrowed.
    pub fn load_data(&mut self, facts: &Facts) {
        for (name, value) in facts {
            self.values.insert(name.clone(), value.clone());
        }

        for (name, value) in &self.defaults {
            if !self.values.contains_key(name) {
                self.values.insert(name.clone(), value.clone());
            }
        }

        debug!("Loaded {} facts ({} known)", facts.len(), self.values.len());
    }

    /// Iteration cap of a forward-chaining pass: `max(50, 3 × rules)`
    pub fn iteration_cap(&self) -> usize {
        MIN_ITERATION_CAP.max(self.rules.len() * 3)
    }

    /// Apply rules until no derived fact changes.
    ///
    /// A rule fires once all its conditions match; its conclusion gets the
    /// weakest premise confidence times the rule strength, combined with any
    /// earlier evidence for the same conclusion. A fired rule is never
    /// evaluated again, so cyclic rule graphs terminate after one traversal.
    pub fn forward_chain(&mut self) -> ChainReport {
        let rules = Arc::clone(&self.rules);
        let cap = self.iteration_cap();
        let mut iterations = 0;
        let mut rules_fired = 0;
        let mut changed = true;

        while changed && iterations < cap {
            changed = false;
            iterations += 1;

            for rule in rules.rules() {
                if self.fired.contains(&rule.id) {
                    continue;
                }

                let Some(premise) = self.premise_confidence(rule) else {
                    continue;
                };

                self.fired.insert(rule.id.clone());
                rules_fired += 1;

                if self.apply_conclusion(rule, premise) {
                    changed = true;
                }
            }
        }

        let converged = !changed;
        if !converged {
            warn!(
                "Forward chaining stopped at iteration cap {} before reaching a fixpoint",
                cap
            );
        }

        info!(
            "Forward chaining finished: {} iterations, {} rules fired, {} facts derived",
            iterations,
            rules_fired,
            self.inferred.len()
        );

        ChainReport {
            iterations,
            rules_fired,
            converged,
        }
    }

    /// Weakest-link confidence of a rule's premises, `None` unless all match
    fn premise_confidence(&self, rule: &Rule) -> Option<f64> {
        let mut premise = MAX_CONFIDENCE;
        for condition in &rule.conditions {
            let evaluation = evaluate(condition, &self.values, &self.inferred);
            if !evaluation.is_match() {
                return None;
            }
            premise = premise.min(evaluation.confidence());
        }
        Some(premise)
    }

    /// Record a fired rule's conclusion; returns whether knowledge changed
    fn apply_conclusion(&mut self, rule: &Rule, premise: f64) -> bool {
        let confidence = clamp_confidence(premise * rule.strength);

        match self.inferred.get(&rule.conclusion).copied() {
            None => {
                self.inferred.insert(rule.conclusion.clone(), confidence);
                self.values
                    .insert(rule.conclusion.clone(), FactValue::Bool(true));
                debug!("Fired {}: {} = {:.2}", rule.id, rule.conclusion, confidence);
                self.trace.push(TraceEntry::Fired {
                    rule_id: rule.id.clone(),
                    conclusion: rule.conclusion.clone(),
                    confidence,
                });
                true
            }
            Some(previous) => {
                let combined = combine(previous, confidence);
                if combined <= previous + UPDATE_EPSILON {
                    debug!("Fired {}: {} unchanged at {:.2}", rule.id, rule.conclusion, previous);
                    return false;
                }

                self.inferred.insert(rule.conclusion.clone(), combined);
                debug!(
                    "Fired {}: {} {:.2} -> {:.2}",
                    rule.id, rule.conclusion, previous, combined
                );
                self.trace.push(TraceEntry::Updated {
                    rule_id: rule.id.clone(),
                    conclusion: rule.conclusion.clone(),
                    previous,
                    current: combined,
                });
                true
            }
        }
    }

    /// Establish a derived fact directly, as if inferred by an earlier pass.
    ///
    /// Never lowers an existing confidence.
    pub fn seed_inferred(&mut self, fact: impl Into<String>, confidence: f64) {
        let confidence = clamp_confidence(confidence);
        let entry = self.inferred.entry(fact.into()).or_insert(confidence);
        *entry = entry.max(confidence);
    }

    /// Record that a fact was solicited; returns false if it already was
    pub fn mark_asked(&mut self, fact: impl Into<String>) -> bool {
        self.asked.insert(fact.into())
    }

    pub fn was_asked(&self, fact: &str) -> bool {
        self.asked.contains(fact)
    }

    /// Raw value of a supplied or derived fact
    pub fn value(&self, fact: &str) -> Option<&FactValue> {
        self.values.get(fact)
    }

    /// Derived confidence of a fact, if it was inferred
    pub fn confidence(&self, fact: &str) -> Option<f64> {
        self.inferred.get(fact).copied()
    }

    pub fn is_derived(&self, fact: &str) -> bool {
        self.inferred.contains_key(fact)
    }

    pub fn has_fired(&self, rule_id: &str) -> bool {
        self.fired.contains(rule_id)
    }

    pub fn values(&self) -> &HashMap<String, FactValue> {
        &self.values
    }

    pub fn inferred_facts(&self) -> &HashMap<String, f64> {
        &self.inferred
    }

    pub fn fired_rules(&self) -> &HashSet<String> {
        &self.fired
    }

    pub fn asked_questions(&self) -> &HashSet<String> {
        &self.asked
    }

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}
