//! Error types for ticket and comment operations.

use crate::entity::{EntityKind, TicketId};
use crate::status::TicketStatus;
use std::fmt;
use thiserror::Error;

/// Result type alias for ticketing operations.
pub type Result<T> = std::result::Result<T, TicketError>;

/// Error taxonomy for the ticketing core.
///
/// Rejections (`StatusTransitionNotAllowed`, `TicketStatusNotAllowed`,
/// `Validation`, `VersionConflict`) are always raised before any write, so an
/// operation failing with one of them has not mutated state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketError {
    // ═══════════════════════════════════════════════════════════
    // Lookup
    // ═══════════════════════════════════════════════════════════

    /// No record with this id in the persistent store.
    #[error("{kind} with id {id} not found")]
    NotFound {
        /// Kind of entity that was looked up
        kind: EntityKind,
        /// Requested identifier
        id: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Workflow
    // ═══════════════════════════════════════════════════════════

    /// Requested status change is illegal from the current status.
    #[error("Status transition not allowed: from `{from}` to `{to}`")]
    StatusTransitionNotAllowed {
        /// Current status
        from: TicketStatus,
        /// Requested status
        to: TicketStatus,
    },

    /// Operation rejected because of the ticket's current status
    /// (comment on a closed ticket, or an edit forbidden by policy).
    #[error("Not allowed in ticket status: {status}")]
    TicketStatusNotAllowed {
        /// The ticket's current status
        status: TicketStatus,
    },

    /// Input failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The ticket changed since it was loaded.
    #[error("Version conflict on ticket {id}: expected version {expected}")]
    VersionConflict {
        /// Ticket being updated
        id: TicketId,
        /// Version the update was based on
        expected: i32,
    },

    // ═══════════════════════════════════════════════════════════
    // System
    // ═══════════════════════════════════════════════════════════

    /// Persistent store call failed. Never retried by the core.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Encoding or decoding a record failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TicketError {
    /// Build a [`TicketError::NotFound`] for any displayable id.
    #[must_use]
    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Returns `true` for the workflow rejections that an API layer maps to
    /// "method not allowed".
    ///
    /// # Examples
    ///
    /// ```
    /// # use ticketdesk_core::{TicketError, TicketStatus};
    /// let err = TicketError::TicketStatusNotAllowed { status: TicketStatus::Closed };
    /// assert!(err.is_not_allowed());
    /// assert!(!TicketError::Validation("x".into()).is_not_allowed());
    /// ```
    #[must_use]
    pub const fn is_not_allowed(&self) -> bool {
        matches!(
            self,
            Self::StatusTransitionNotAllowed { .. } | Self::TicketStatusNotAllowed { .. }
        )
    }

    /// Returns `true` for [`TicketError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_message_names_both_statuses() {
        let err = TicketError::StatusTransitionNotAllowed {
            from: TicketStatus::Closed,
            to: TicketStatus::Open,
        };
        assert_eq!(
            err.to_string(),
            "Status transition not allowed: from `closed` to `open`"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = TicketError::not_found(EntityKind::Comment, "abc");
        assert_eq!(err.to_string(), "comment with id abc not found");
        assert!(err.is_not_found());
    }
}
