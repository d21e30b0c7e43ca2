//! Ticket status and the status transition table.
//!
//! Tickets are created `open`, may move to `answered` or `closed`; from
//! `answered` to `wait_answer` or `closed`; from `wait_answer` back to
//! `answered` or to `closed`. `closed` is final: no status change and no new
//! comments once a ticket is closed.

use crate::error::{Result, TicketError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a ticket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly created, awaiting a first answer.
    #[default]
    Open,
    /// Support has answered.
    Answered,
    /// Waiting on the reporter.
    WaitAnswer,
    /// Terminal.
    Closed,
}

impl TicketStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 4] = [Self::Open, Self::Answered, Self::WaitAnswer, Self::Closed];

    /// Wire/storage representation (`open`, `answered`, `wait_answer`, `closed`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Answered => "answered",
            Self::WaitAnswer => "wait_answer",
            Self::Closed => "closed",
        }
    }

    /// Statuses reachable from `self` in one transition.
    ///
    /// A status never lists itself, so `from == to` is always rejected.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::Answered, Self::Closed],
            Self::Answered => &[Self::WaitAnswer, Self::Closed],
            Self::WaitAnswer => &[Self::Answered, Self::Closed],
            Self::Closed => &[],
        }
    }

    /// Returns `true` if `self → to` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Returns `true` for statuses with no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Validate a transition from `self` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StatusTransitionNotAllowed`] carrying the
    /// attempted pair when `to` is not reachable from `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticketdesk_core::TicketStatus;
    ///
    /// assert_eq!(
    ///     TicketStatus::Answered.transition(TicketStatus::WaitAnswer),
    ///     Ok(TicketStatus::WaitAnswer)
    /// );
    /// assert!(TicketStatus::Open.transition(TicketStatus::WaitAnswer).is_err());
    /// ```
    pub fn transition(self, to: Self) -> Result<Self> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(TicketError::StatusTransitionNotAllowed { from: self, to })
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(Self::Open),
            "answered" => Ok(Self::Answered),
            "wait_answer" => Ok(Self::WaitAnswer),
            "closed" => Ok(Self::Closed),
            other => Err(TicketError::Validation(format!(
                "unknown ticket status `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_status() -> impl Strategy<Value = TicketStatus> {
        prop::sample::select(TicketStatus::ALL.to_vec())
    }

    #[test]
    fn test_open_transitions() {
        assert!(TicketStatus::Open.can_transition_to(TicketStatus::Answered));
        assert!(TicketStatus::Open.can_transition_to(TicketStatus::Closed));
        assert!(!TicketStatus::Open.can_transition_to(TicketStatus::WaitAnswer));
    }

    #[test]
    fn test_wait_answer_mirrors_answered() {
        assert!(TicketStatus::WaitAnswer.can_transition_to(TicketStatus::Answered));
        assert!(TicketStatus::WaitAnswer.can_transition_to(TicketStatus::Closed));
        assert!(!TicketStatus::WaitAnswer.can_transition_to(TicketStatus::Open));
    }

    #[test]
    fn test_closed_is_terminal() {
        assert!(TicketStatus::Closed.is_terminal());
        for to in TicketStatus::ALL {
            assert_eq!(
                TicketStatus::Closed.transition(to),
                Err(TicketError::StatusTransitionNotAllowed {
                    from: TicketStatus::Closed,
                    to
                })
            );
        }
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&TicketStatus::WaitAnswer).unwrap();
        assert_eq!(json, "\"wait_answer\"");
        let parsed: TicketStatus = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(parsed, TicketStatus::Closed);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!(matches!(
            "pending".parse::<TicketStatus>(),
            Err(TicketError::Validation(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_same_status_never_transitions(status in any_status()) {
            prop_assert!(status.transition(status).is_err());
        }

        #[test]
        fn prop_every_non_terminal_status_can_close(status in any_status()) {
            prop_assert_eq!(
                status.can_transition_to(TicketStatus::Closed),
                !status.is_terminal()
            );
        }

        #[test]
        fn prop_rejection_carries_attempted_pair(from in any_status(), to in any_status()) {
            match from.transition(to) {
                Ok(next) => prop_assert_eq!(next, to),
                Err(TicketError::StatusTransitionNotAllowed { from: f, to: t }) => {
                    prop_assert_eq!((f, t), (from, to));
                }
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
        }

        #[test]
        fn prop_as_str_round_trips(status in any_status()) {
            prop_assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), status);
        }
    }
}
