//! # Redemption Lifecycle
//!
//! ```text
//!              approve
//!   pending ──────────► approved   (terminal)
//!      │
//!      │ reject
//!      ▼
//!   rejected                       (terminal)
//! ```
//!
//! Transitions are admin-triggered. There is no expiry: a pending redemption
//! stays pending until someone decides it.

use crate::error::{CoreError, CoreResult};
use crate::types::RedemptionStatus;

impl RedemptionStatus {
    /// Approved and rejected redemptions never change again.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, RedemptionStatus::Approved | RedemptionStatus::Rejected)
    }

    /// Only a pending redemption can be decided, and only into a terminal state.
    pub const fn can_transition_to(&self, next: RedemptionStatus) -> bool {
        !self.is_terminal() && next.is_terminal()
    }
}

/// Validates a decision on a redemption and returns the new status.
pub fn transition(from: RedemptionStatus, to: RedemptionStatus) -> CoreResult<RedemptionStatus> {
    if from.can_transition_to(to) {
        Ok(to)
    } else {
        Err(CoreError::InvalidRedemptionTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_be_decided() {
        assert_eq!(
            transition(RedemptionStatus::Pending, RedemptionStatus::Approved).unwrap(),
            RedemptionStatus::Approved
        );
        assert_eq!(
            transition(RedemptionStatus::Pending, RedemptionStatus::Rejected).unwrap(),
            RedemptionStatus::Rejected
        );
    }

    #[test]
    fn test_terminal_states_are_final() {
        for from in [RedemptionStatus::Approved, RedemptionStatus::Rejected] {
            assert!(from.is_terminal());
            for to in [
                RedemptionStatus::Pending,
                RedemptionStatus::Approved,
                RedemptionStatus::Rejected,
            ] {
                assert!(matches!(
                    transition(from, to),
                    Err(CoreError::InvalidRedemptionTransition { .. })
                ));
            }
        }
    }

    #[test]
    fn test_pending_to_pending_is_refused() {
        assert!(transition(RedemptionStatus::Pending, RedemptionStatus::Pending).is_err());
    }
}
