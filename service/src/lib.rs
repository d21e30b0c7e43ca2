//! # Ticketdesk
//!
//! Support ticketing service: tickets with a status workflow, comments
//! attached to tickets, and cache-aside reads in front of `PostgreSQL`.
//!
//! ## Architecture
//!
//! ```text
//!  ┌───────────────┐   ┌────────────────┐
//!  │ TicketService │   │ CommentService │   status machine, guards
//!  └───────┬───────┘   └───────┬────────┘
//!          │  get: cache first │
//!          ├──────────┬────────┤
//!          ▼          ▼        ▼
//!  ┌──────────────┐  ┌──────────────────┐
//!  │  CacheAside  │  │  TicketStore /   │   source of truth
//!  │   (Redis)    │  │  CommentStore    │
//!  └──────────────┘  │   (PostgreSQL)   │
//!                    └──────────────────┘
//! ```
//!
//! Writes go to the store first; the matching cache key is invalidated
//! after the write commits. Cache failures are logged and never surface to
//! callers.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use ticketdesk::{CommentService, TicketService};
//! use ticketdesk_core::{CacheAside, CachePolicy, NewComment, NewTicket, TicketPatch, TicketStatus};
//! use ticketdesk_testing::{InMemoryCache, InMemoryStore, test_clock};
//!
//! # async fn example() -> ticketdesk_core::Result<()> {
//! let store = Arc::new(InMemoryStore::new());
//! let cache = Arc::new(InMemoryCache::new());
//! let clock = Arc::new(test_clock());
//!
//! let tickets = TicketService::new(
//!     Arc::clone(&store),
//!     CacheAside::new(Arc::clone(&cache), CachePolicy::default()),
//!     clock.clone(),
//! );
//! let comments = CommentService::new(
//!     store,
//!     CacheAside::new(cache, CachePolicy::disabled()),
//!     clock,
//! );
//!
//! let ticket = tickets
//!     .create(NewTicket::new("VPN down", "ana@example.com", "ana"))
//!     .await?;
//! tickets
//!     .update(ticket.id, TicketPatch::new("agent").with_status(TicketStatus::Closed))
//!     .await?;
//!
//! let rejected = comments
//!     .create(NewComment::new(ticket.id, "still broken", "ana@example.com", "ana"))
//!     .await;
//! assert!(rejected.is_err());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod config;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use services::{CommentService, ServicePolicy, TicketService};
