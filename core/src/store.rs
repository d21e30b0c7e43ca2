//! Persistent store contracts.
//!
//! The store is the only source of truth. Implementations:
//!
//! - `PostgresStore` (in `ticketdesk-postgres`): production
//! - `InMemoryStore` (in `ticketdesk-testing`): fast, deterministic tests
//!
//! Every method may fail with [`crate::TicketError::StoreUnavailable`]; the
//! core propagates that unchanged and never retries.
//!
//! # Example
//!
//! ```no_run
//! use ticketdesk_core::store::TicketStore;
//! use ticketdesk_core::{Page, Result, TicketId};
//!
//! async fn first_page<S: TicketStore>(store: &S) -> Result<usize> {
//!     let tickets = store.find_ticket_page(Page::new(0, 10)?).await?;
//!     Ok(tickets.len())
//! }
//! ```

use crate::entity::{Comment, CommentId, Ticket, TicketId, TicketVersion};
use crate::error::{Result, TicketError};
use std::future::Future;

/// Offset/limit window over a listing.
///
/// `skip` is a **page index**, not a row offset: the row offset is
/// `skip * limit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    skip: u32,
    limit: u32,
}

impl Page {
    /// Largest accepted page size.
    pub const MAX_LIMIT: u32 = 1000;

    /// Page size used when the caller does not choose one.
    pub const DEFAULT_LIMIT: u32 = 100;

    /// Page number `skip` of size `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Validation`] unless `1 <= limit <= MAX_LIMIT`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticketdesk_core::Page;
    ///
    /// let page = Page::new(2, 10).unwrap();
    /// assert_eq!(page.offset(), 20);
    /// assert!(Page::new(0, 0).is_err());
    /// ```
    pub fn new(skip: u32, limit: u32) -> Result<Self> {
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(TicketError::Validation(format!(
                "limit must be between 1 and {}, got {limit}",
                Self::MAX_LIMIT
            )));
        }
        Ok(Self { skip, limit })
    }

    /// Page index.
    #[must_use]
    pub const fn skip(&self) -> u32 {
        self.skip
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Row offset (`skip * limit`).
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.skip as u64 * self.limit as u64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Ticket persistence.
pub trait TicketStore: Send + Sync {
    /// Load a ticket by id.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StoreUnavailable`] if the store call fails.
    fn find_ticket(&self, id: TicketId) -> impl Future<Output = Result<Option<Ticket>>> + Send;

    /// Load one page of tickets ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StoreUnavailable`] if the store call fails.
    fn find_ticket_page(&self, page: Page) -> impl Future<Output = Result<Vec<Ticket>>> + Send;

    /// Insert a new ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StoreUnavailable`] if the store call fails.
    fn insert_ticket(&self, ticket: &Ticket) -> impl Future<Output = Result<Ticket>> + Send;

    /// Replace `previous` with `updated`, archiving `previous` into history.
    ///
    /// Applied only if the stored version still equals `previous.version`;
    /// the write and the archive row commit together or not at all.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] if the ticket no longer exists
    /// - [`TicketError::VersionConflict`] if the stored version moved on
    /// - [`TicketError::StoreUnavailable`] if the store call fails
    fn update_ticket(
        &self,
        previous: &Ticket,
        updated: &Ticket,
    ) -> impl Future<Output = Result<Ticket>> + Send;

    /// Delete a ticket together with its comments and history.
    ///
    /// # Returns
    ///
    /// The removed ticket, or `None` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StoreUnavailable`] if the store call fails.
    fn delete_ticket(&self, id: TicketId) -> impl Future<Output = Result<Option<Ticket>>> + Send;

    /// Archived versions of a ticket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StoreUnavailable`] if the store call fails.
    fn ticket_history(
        &self,
        id: TicketId,
    ) -> impl Future<Output = Result<Vec<TicketVersion>>> + Send;
}

/// Comment persistence.
pub trait CommentStore: Send + Sync {
    /// Load a comment by id.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StoreUnavailable`] if the store call fails.
    fn find_comment(&self, id: CommentId) -> impl Future<Output = Result<Option<Comment>>> + Send;

    /// Load one page of comments ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StoreUnavailable`] if the store call fails.
    fn find_comment_page(&self, page: Page) -> impl Future<Output = Result<Vec<Comment>>> + Send;

    /// Load one page of the comments attached to `ticket_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StoreUnavailable`] if the store call fails.
    fn find_comments_for_ticket(
        &self,
        ticket_id: TicketId,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Comment>>> + Send;

    /// Insert a new comment.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] if the referenced ticket does not exist
    /// - [`TicketError::StoreUnavailable`] if the store call fails
    fn insert_comment(&self, comment: &Comment) -> impl Future<Output = Result<Comment>> + Send;

    /// Persist an updated comment.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] if the comment no longer exists
    /// - [`TicketError::StoreUnavailable`] if the store call fails
    fn update_comment(&self, comment: &Comment) -> impl Future<Output = Result<Comment>> + Send;

    /// Delete a comment.
    ///
    /// # Returns
    ///
    /// The removed comment, or `None` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StoreUnavailable`] if the store call fails.
    fn delete_comment(
        &self,
        id: CommentId,
    ) -> impl Future<Output = Result<Option<Comment>>> + Send;
}
