//! Condition Evaluator
//!
//! Resolves one `(fact, operator, target)` premise against the current
//! knowledge of a session. Every anomaly (unknown fact, incomparable kinds)
//! is an explicit outcome rather than an error: a malformed condition never
//! aborts inference, it simply does not match.

use crate::confidence::{MAX_CONFIDENCE, MIN_CONFIDENCE};
use crate::fact::FactValue;
use crate::rule::Condition;
use std::borrow::Cow;
use std::collections::HashMap;

/// Outcome of evaluating a single condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// Condition holds with the given confidence
    Matched { confidence: f64 },
    /// Fact known and comparable, but the comparison is false
    NotMatched,
    /// Fact neither supplied nor derived
    UnknownFact,
    /// Fact value and target cannot be compared (e.g. text vs number)
    Incomparable,
}

impl Evaluation {
    pub fn is_match(&self) -> bool {
        matches!(self, Evaluation::Matched { .. })
    }

    /// Confidence of the match, zero for every non-match
    pub fn confidence(&self) -> f64 {
        match self {
            Evaluation::Matched { confidence } => *confidence,
            _ => MIN_CONFIDENCE,
        }
    }

    /// `(matched, confidence)` pair
    pub fn as_pair(&self) -> (bool, f64) {
        (self.is_match(), self.confidence())
    }
}

/// Evaluate `condition` against supplied `values` and derived `inferred` confidences.
///
/// A fact present in `values` is compared by its stored value; its confidence
/// is the derived confidence when it has one, otherwise it is a fully trusted
/// input. A fact known only through `inferred` is compared as `confidence > 0`
/// for boolean targets and as the confidence itself otherwise.
pub fn evaluate(
    condition: &Condition,
    values: &HashMap<String, FactValue>,
    inferred: &HashMap<String, f64>,
) -> Evaluation {
    let (current, confidence): (Cow<'_, FactValue>, f64) =
        if let Some(value) = values.get(&condition.fact) {
            let confidence = inferred
                .get(&condition.fact)
                .copied()
                .unwrap_or(MAX_CONFIDENCE);
            (Cow::Borrowed(value), confidence)
        } else if let Some(&confidence) = inferred.get(&condition.fact) {
            let synthesized = if condition.target.is_bool() {
                FactValue::Bool(confidence > 0.0)
            } else {
                FactValue::Float(confidence)
            };
            (Cow::Owned(synthesized), confidence)
        } else {
            return Evaluation::UnknownFact;
        };

    // Boolean targets compare by truthiness; the operator is not consulted
    if let Some(target) = condition.target.as_bool() {
        return if current.truthy() == target {
            Evaluation::Matched { confidence }
        } else {
            Evaluation::NotMatched
        };
    }

    match current.compare(&condition.target) {
        Some(ordering) if condition.op.accepts(ordering) => Evaluation::Matched { confidence },
        Some(_) => Evaluation::NotMatched,
        None => Evaluation::Incomparable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Operator;

    fn knowledge(
        values: &[(&str, FactValue)],
        inferred: &[(&str, f64)],
    ) -> (HashMap<String, FactValue>, HashMap<String, f64>) {
        (
            values.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            inferred.iter().map(|(k, c)| (k.to_string(), *c)).collect(),
        )
    }

    #[test]
    fn test_direct_input_full_confidence() {
        let (values, inferred) = knowledge(&[("amount", FactValue::Int(2000))], &[]);
        let cond = Condition::new("amount", Operator::Gt, 1500);
        assert_eq!(evaluate(&cond, &values, &inferred), Evaluation::Matched { confidence: 1.0 });
    }

    #[test]
    fn test_derived_fact_uses_stored_confidence() {
        let (values, inferred) = knowledge(
            &[("high_amount", FactValue::Bool(true))],
            &[("high_amount", 0.6)],
        );
        let cond = Condition::is_true("high_amount");
        assert_eq!(evaluate(&cond, &values, &inferred).as_pair(), (true, 0.6));
    }

    #[test]
    fn test_inferred_only_fact() {
        let (values, inferred) = knowledge(&[], &[("risk", 0.4)]);

        let boolean = Condition::is_true("risk");
        assert_eq!(evaluate(&boolean, &values, &inferred).as_pair(), (true, 0.4));

        let numeric = Condition::new("risk", Operator::Ge, 0.5);
        assert_eq!(evaluate(&numeric, &values, &inferred), Evaluation::NotMatched);

        let numeric = Condition::new("risk", Operator::Lt, 0.5);
        assert_eq!(evaluate(&numeric, &values, &inferred).as_pair(), (true, 0.4));
    }

    #[test]
    fn test_unknown_fact() {
        let (values, inferred) = knowledge(&[], &[]);
        let cond = Condition::new("amount", Operator::Gt, 10);
        let result = evaluate(&cond, &values, &inferred);
        assert_eq!(result, Evaluation::UnknownFact);
        assert_eq!(result.as_pair(), (false, 0.0));
    }

    #[test]
    fn test_boolean_target_mismatch() {
        let (values, inferred) = knowledge(&[("device_seen_before", FactValue::Bool(true))], &[]);
        let cond = Condition::new("device_seen_before", Operator::Eq, false);
        assert_eq!(evaluate(&cond, &values, &inferred).as_pair(), (false, 0.0));
    }

    #[test]
    fn test_boolean_target_uses_truthiness() {
        let (values, inferred) = knowledge(&[("past_chargebacks", FactValue::Int(2))], &[]);
        let cond = Condition::is_true("past_chargebacks");
        assert!(evaluate(&cond, &values, &inferred).is_match());
    }

    #[test]
    fn test_type_mismatch_is_non_match() {
        let (values, inferred) = knowledge(&[("country", FactValue::from("FR"))], &[]);
        let cond = Condition::new("country", Operator::Gt, 3);
        let result = evaluate(&cond, &values, &inferred);
        assert_eq!(result, Evaluation::Incomparable);
        assert_eq!(result.as_pair(), (false, 0.0));
    }

    #[test]
    fn test_bool_input_against_numeric_target() {
        let (values, inferred) = knowledge(&[("past_chargebacks", FactValue::Bool(false))], &[]);
        let cond = Condition::new("past_chargebacks", Operator::Eq, 0);
        assert_eq!(evaluate(&cond, &values, &inferred), Evaluation::Matched { confidence: 1.0 });
    }

    #[test]
    fn test_numeric_equality_across_kinds() {
        let (values, inferred) = knowledge(&[("past_chargebacks", FactValue::Float(0.0))], &[]);
        let cond = Condition::new("past_chargebacks", Operator::Eq, 0);
        assert!(evaluate(&cond, &values, &inferred).is_match());
    }
}
