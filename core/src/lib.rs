//! # Ticketdesk Core
//!
//! Domain records and contracts for the Ticketdesk support ticketing service.
//!
//! This crate holds everything that has actual invariants; the backends
//! (`ticketdesk-postgres`, `ticketdesk-redis`) and the service layer
//! (`ticketdesk`) only plug into the traits defined here.
//!
//! ## Core Concepts
//!
//! - **Ticket**: primary work item with a lifecycle [`TicketStatus`]
//! - **Comment**: a note attached to exactly one ticket
//! - **Status machine**: [`TicketStatus::transition`] validates status changes
//! - **Store**: [`store::TicketStore`] / [`store::CommentStore`], the source of truth
//! - **Cache**: [`cache::EntityCache`] plus the typed [`cache::CacheAside`] wrapper
//!
//! ## Status Workflow
//!
//! ```text
//!   ┌──────┐      ┌──────────┐      ┌─────────────┐
//!   │ OPEN │ ───▶ │ ANSWERED │ ◀──▶ │ WAIT_ANSWER │
//!   └──────┘      └──────────┘      └─────────────┘
//!      │               │                   │
//!      └───────────────┴─────────┬─────────┘
//!                                ▼
//!                          ┌──────────┐
//!                          │  CLOSED  │  (terminal)
//!                          └──────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use ticketdesk_core::{TicketError, TicketStatus};
//!
//! assert!(TicketStatus::Open.transition(TicketStatus::Answered).is_ok());
//! assert!(matches!(
//!     TicketStatus::Closed.transition(TicketStatus::Open),
//!     Err(TicketError::StatusTransitionNotAllowed { .. })
//! ));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod entity;
pub mod environment;
pub mod error;
pub mod status;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use cache::{CacheAside, CacheError, CachePolicy, EntityCache, NoopCache};
pub use chrono::{DateTime, Utc};
pub use entity::{
    Audit, Comment, CommentId, CommentPatch, Entity, EntityKind, NewComment, NewTicket, Ticket,
    TicketId, TicketPatch, TicketVersion, Timestamps,
};
pub use error::{Result, TicketError};
pub use status::TicketStatus;
pub use store::{CommentStore, Page, TicketStore};
