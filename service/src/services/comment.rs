//! Comment service.

use super::ServicePolicy;
use std::sync::Arc;
use ticketdesk_core::cache::{CacheAside, EntityCache};
use ticketdesk_core::environment::Clock;
use ticketdesk_core::store::{CommentStore, TicketStore};
use ticketdesk_core::{
    Comment, CommentId, CommentPatch, EntityKind, NewComment, Page, Result, Ticket, TicketError,
    TicketId, TicketStatus,
};

/// Get, list, create, update and delete comments.
///
/// The cache is consulted only when its policy is enabled (off by
/// default); otherwise every call goes straight to the store.
pub struct CommentService<S, C> {
    store: Arc<S>,
    cache: CacheAside<C>,
    clock: Arc<dyn Clock>,
    policy: ServicePolicy,
}

impl<S, C> Clone for CommentService<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: self.cache.clone(),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<S, C> CommentService<S, C>
where
    S: CommentStore + TicketStore,
    C: EntityCache,
{
    /// Create a service with the default [`ServicePolicy`].
    #[must_use]
    pub fn new(store: Arc<S>, cache: CacheAside<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            cache,
            clock,
            policy: ServicePolicy::default(),
        }
    }

    /// Replace the workflow policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ServicePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch a comment.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] if no such comment exists
    /// - [`TicketError::StoreUnavailable`] if the store call fails
    #[tracing::instrument(skip(self), fields(comment_id = %id))]
    pub async fn get(&self, id: CommentId) -> Result<Comment> {
        if let Some(comment) = self.cache.get::<Comment>(id).await {
            return Ok(comment);
        }

        let comment = self
            .store
            .find_comment(id)
            .await?
            .ok_or_else(|| TicketError::not_found(EntityKind::Comment, id))?;

        self.cache.put(&comment).await;
        Ok(comment)
    }

    /// Page `skip` of size `limit` over all comments, oldest first.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] unless `1 <= limit <= 1000`
    /// - [`TicketError::StoreUnavailable`] if the store call fails
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Comment>> {
        let page = Page::new(skip, limit)?;
        self.store.find_comment_page(page).await
    }

    /// Page `skip` of size `limit` over the comments of one ticket.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] unless `1 <= limit <= 1000`
    /// - [`TicketError::NotFound`] if the ticket does not exist
    /// - [`TicketError::StoreUnavailable`] if a store call fails
    #[tracing::instrument(skip(self), fields(ticket_id = %ticket_id))]
    pub async fn list_for_ticket(
        &self,
        ticket_id: TicketId,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Comment>> {
        let page = Page::new(skip, limit)?;
        self.load_ticket(ticket_id).await?;
        self.store.find_comments_for_ticket(ticket_id, page).await
    }

    /// Attach a comment to an existing, non-CLOSED ticket.
    ///
    /// The CLOSED check and the insert are separate store calls: a ticket
    /// closed in between still receives the comment.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] if `new` is invalid
    /// - [`TicketError::NotFound`] if the ticket does not exist
    /// - [`TicketError::TicketStatusNotAllowed`] if the ticket is CLOSED
    /// - [`TicketError::StoreUnavailable`] if a store call fails
    #[tracing::instrument(skip(self, new), fields(ticket_id = %new.ticket_id))]
    pub async fn create(&self, new: NewComment) -> Result<Comment> {
        let comment = Comment::create(CommentId::new(), new, self.clock.now())?;

        let ticket = self.load_ticket(comment.ticket_id).await?;
        if ticket.status == TicketStatus::Closed {
            tracing::debug!(ticket_id = %ticket.id, "Rejected comment on closed ticket");
            return Err(TicketError::TicketStatusNotAllowed {
                status: ticket.status,
            });
        }

        let comment = self.store.insert_comment(&comment).await?;

        tracing::info!(
            comment_id = %comment.id,
            ticket_id = %comment.ticket_id,
            "Comment created"
        );
        Ok(comment)
    }

    /// Apply `patch` to a comment, then invalidate `comment:{id}`.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] if `patch` is invalid
    /// - [`TicketError::NotFound`] if the comment does not exist
    /// - [`TicketError::TicketStatusNotAllowed`] if the parent ticket is
    ///   CLOSED and the policy forbids edits on closed tickets
    /// - [`TicketError::StoreUnavailable`] if a store call fails
    #[tracing::instrument(skip(self, patch), fields(comment_id = %id, updated_by = %patch.updated_by))]
    pub async fn update(&self, id: CommentId, patch: CommentPatch) -> Result<Comment> {
        patch.validate()?;

        let current = self
            .store
            .find_comment(id)
            .await?
            .ok_or_else(|| TicketError::not_found(EntityKind::Comment, id))?;

        if !self.policy.allow_edits_on_closed {
            let ticket = self.load_ticket(current.ticket_id).await?;
            if ticket.status.is_terminal() {
                return Err(TicketError::TicketStatusNotAllowed {
                    status: ticket.status,
                });
            }
        }

        let updated = current.patched(&patch, self.clock.now());
        let updated = self.store.update_comment(&updated).await?;
        self.cache.invalidate::<Comment>(id).await;

        tracing::info!(comment_id = %id, "Comment updated");
        Ok(updated)
    }

    /// Delete a comment, then invalidate `comment:{id}`.
    ///
    /// # Returns
    ///
    /// The removed comment.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] if the comment does not exist
    /// - [`TicketError::StoreUnavailable`] if the store call fails
    #[tracing::instrument(skip(self), fields(comment_id = %id))]
    pub async fn remove(&self, id: CommentId) -> Result<Comment> {
        let removed = self
            .store
            .delete_comment(id)
            .await?
            .ok_or_else(|| TicketError::not_found(EntityKind::Comment, id))?;
        self.cache.invalidate::<Comment>(id).await;

        tracing::info!(comment_id = %id, ticket_id = %removed.ticket_id, "Comment removed");
        Ok(removed)
    }

    /// Current ticket state, straight from the store.
    async fn load_ticket(&self, id: TicketId) -> Result<Ticket> {
        self.store
            .find_ticket(id)
            .await?
            .ok_or_else(|| TicketError::not_found(EntityKind::Ticket, id))
    }
}
