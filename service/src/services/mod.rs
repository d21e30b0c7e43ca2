//! Ticket and comment services.
//!
//! Each service orchestrates the persistent store, the cache-aside layer,
//! and the status machine. Two ordering rules hold everywhere:
//!
//! - rejections (`NotFound`, illegal transitions, closed-ticket guards,
//!   validation) are decided before any write
//! - a store commit always precedes the cache invalidation it triggers
//!
//! Cache failures never reach callers; see [`ticketdesk_core::cache`].

mod comment;
mod ticket;

pub use comment::CommentService;
pub use ticket::TicketService;

/// Workflow switches shared by both services.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServicePolicy {
    /// Allow edits that leave the status untouched on CLOSED tickets
    /// (ticket field patches, comment body edits).
    pub allow_edits_on_closed: bool,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self {
            allow_edits_on_closed: true,
        }
    }
}
