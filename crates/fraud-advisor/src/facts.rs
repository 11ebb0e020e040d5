//! Fact vocabulary shared by the catalog and the heuristics

use serde::{Deserialize, Serialize};
use std::fmt;

pub const AMOUNT: &str = "amount";

pub const LOCATION_MISMATCH: &str = "location_mismatch";
pub const LOCATION_EXPLAINED: &str = "location_explained";
pub const RECENT_ADDRESS_CHANGE: &str = "recent_address_change";
pub const NEW_DEVICE: &str = "new_device";

// Question facts
pub const USER_CONFIRMED_TRANSACTION: &str = "user_confirmed_transaction";
pub const OTP_PASSED: &str = "otp_passed";
pub const USER_CONFIRMED_TRAVEL: &str = "user_confirmed_travel";
pub const SHIPPING_ADDRESS_CHANGED_RECENTLY: &str = "shipping_address_changed_recently";
pub const DEVICE_SEEN_BEFORE: &str = "device_seen_before";

/// Questions that directly verify the cardholder
pub const VERIFICATION_QUESTIONS: [&str; 2] = [USER_CONFIRMED_TRANSACTION, OTP_PASSED];

/// Decision action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Decline,
    ManualReview,
    StepUpVerify,
    Approve,
}

impl Action {
    /// Every action, in the order they are collected
    pub const ALL: [Action; 4] = [
        Action::Decline,
        Action::ManualReview,
        Action::StepUpVerify,
        Action::Approve,
    ];

    /// Derived fact carrying this action's confidence
    pub fn fact(&self) -> &'static str {
        match self {
            Action::Decline => "DECLINE_recommended",
            Action::ManualReview => "MANUAL_REVIEW_recommended",
            Action::StepUpVerify => "STEP_UP_VERIFY_recommended",
            Action::Approve => "APPROVE_recommended",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Action::Decline => "DECLINE",
            Action::ManualReview => "MANUAL REVIEW",
            Action::StepUpVerify => "STEP UP VERIFY",
            Action::Approve => "APPROVE",
        }
    }

    /// Decline and manual review stop the transaction from going through as-is
    pub fn is_adverse(&self) -> bool {
        matches!(self, Action::Decline | Action::ManualReview)
    }

    pub fn from_fact(fact: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|a| a.fact() == fact)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_fact(action.fact()), Some(action));
        }
        assert_eq!(Action::from_fact("legitimate_user"), None);
    }

    #[test]
    fn test_adverse_actions() {
        assert!(Action::Decline.is_adverse());
        assert!(Action::ManualReview.is_adverse());
        assert!(!Action::StepUpVerify.is_adverse());
        assert!(!Action::Approve.is_adverse());
    }
}
