//! Ticket service.

use super::ServicePolicy;
use std::sync::Arc;
use ticketdesk_core::cache::{CacheAside, EntityCache};
use ticketdesk_core::environment::Clock;
use ticketdesk_core::store::TicketStore;
use ticketdesk_core::{
    EntityKind, NewTicket, Page, Result, Ticket, TicketError, TicketId, TicketPatch, TicketVersion,
};

/// Get, list, create, update and delete tickets.
///
/// Single-ticket reads go through the cache (`ticket:{id}`); listings and
/// the read half of `update` always hit the store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ticketdesk::TicketService;
/// use ticketdesk_core::{CacheAside, CachePolicy, NewTicket, TicketPatch, TicketStatus};
/// use ticketdesk_testing::{InMemoryCache, InMemoryStore, test_clock};
///
/// # async fn example() -> ticketdesk_core::Result<()> {
/// let tickets = TicketService::new(
///     Arc::new(InMemoryStore::new()),
///     CacheAside::new(Arc::new(InMemoryCache::new()), CachePolicy::default()),
///     Arc::new(test_clock()),
/// );
///
/// let ticket = tickets
///     .create(NewTicket::new("Wi-Fi drops", "kim@example.com", "kim"))
///     .await?;
/// let answered = tickets
///     .update(ticket.id, TicketPatch::new("agent").with_status(TicketStatus::Answered))
///     .await?;
/// assert_eq!(answered.version, 2);
/// # Ok(())
/// # }
/// ```
pub struct TicketService<S, C> {
    store: Arc<S>,
    cache: CacheAside<C>,
    clock: Arc<dyn Clock>,
    policy: ServicePolicy,
}

impl<S, C> Clone for TicketService<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: self.cache.clone(),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<S: TicketStore, C: EntityCache> TicketService<S, C> {
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

    /// Fetch a ticket, cache first.
    ///
    /// A miss reads the store and populates the cache.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] if no such ticket exists
    /// - [`TicketError::StoreUnavailable`] if the store call fails
    #[tracing::instrument(skip(self), fields(ticket_id = %id))]
    pub async fn get(&self, id: TicketId) -> Result<Ticket> {
        if let Some(ticket) = self.cache.get::<Ticket>(id).await {
            return Ok(ticket);
        }

        let ticket = self
            .store
            .find_ticket(id)
            .await?
            .ok_or_else(|| TicketError::not_found(EntityKind::Ticket, id))?;

        self.cache.put(&ticket).await;
        Ok(ticket)
    }

    /// Page `skip` of size `limit`, oldest first. Never cached.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] unless `1 <= limit <= 1000`
    /// - [`TicketError::StoreUnavailable`] if the store call fails
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Ticket>> {
        let page = Page::new(skip, limit)?;
        self.store.find_ticket_page(page).await
    }

    /// Create a ticket. The cache is not touched.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] if `new` is invalid
    /// - [`TicketError::StoreUnavailable`] if the store call fails
    #[tracing::instrument(skip(self, new), fields(created_by = %new.created_by))]
    pub async fn create(&self, new: NewTicket) -> Result<Ticket> {
        let ticket = Ticket::create(TicketId::new(), new, self.clock.now())?;
        let ticket = self.store.insert_ticket(&ticket).await?;

        tracing::info!(ticket_id = %ticket.id, status = %ticket.status, "Ticket created");
        Ok(ticket)
    }

    /// Apply `patch` to the current stored state of the ticket.
    ///
    /// A requested status is checked against the transition table; a patch
    /// without a status skips that check but is still subject to the
    /// closed-ticket edit policy. On success the version is bumped, the
    /// previous version is archived, and `ticket:{id}` is invalidated.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] if `patch` is invalid
    /// - [`TicketError::NotFound`] if no such ticket exists
    /// - [`TicketError::StatusTransitionNotAllowed`] for an illegal status change
    /// - [`TicketError::TicketStatusNotAllowed`] for an edit on a CLOSED ticket
    ///   when the policy forbids it
    /// - [`TicketError::VersionConflict`] if the ticket changed concurrently
    ///   or its version is exhausted
    /// - [`TicketError::StoreUnavailable`] if a store call fails
    #[tracing::instrument(skip(self, patch), fields(ticket_id = %id, updated_by = %patch.updated_by))]
    pub async fn update(&self, id: TicketId, patch: TicketPatch) -> Result<Ticket> {
        patch.validate()?;

        let current = self
            .store
            .find_ticket(id)
            .await?
            .ok_or_else(|| TicketError::not_found(EntityKind::Ticket, id))?;

        match patch.status {
            Some(to) => {
                current.status.transition(to)?;
            }
            None if current.status.is_terminal() && !self.policy.allow_edits_on_closed => {
                return Err(TicketError::TicketStatusNotAllowed {
                    status: current.status,
                });
            }
            None => {}
        }

        let updated = current.patched(&patch, self.clock.now())?;
        let updated = self.store.update_ticket(&current, &updated).await?;
        self.cache.invalidate::<Ticket>(id).await;

        tracing::info!(
            ticket_id = %id,
            from = %current.status,
            to = %updated.status,
            version = updated.version,
            "Ticket updated"
        );
        Ok(updated)
    }

    /// Delete a ticket with its comments and history, then invalidate
    /// `ticket:{id}`.
    ///
    /// # Returns
    ///
    /// The removed ticket.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] if no such ticket exists
    /// - [`TicketError::StoreUnavailable`] if a store call fails
    #[tracing::instrument(skip(self), fields(ticket_id = %id))]
    pub async fn remove(&self, id: TicketId) -> Result<Ticket> {
        let removed = self
            .store
            .delete_ticket(id)
            .await?
            .ok_or_else(|| TicketError::not_found(EntityKind::Ticket, id))?;
        self.cache.invalidate::<Ticket>(id).await;

        tracing::info!(ticket_id = %id, "Ticket removed");
        Ok(removed)
    }

    /// Archived versions of a ticket, oldest first.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] if no such ticket exists
    /// - [`TicketError::StoreUnavailable`] if a store call fails
    #[tracing::instrument(skip(self), fields(ticket_id = %id))]
    pub async fn history(&self, id: TicketId) -> Result<Vec<TicketVersion>> {
        if self.store.find_ticket(id).await?.is_none() {
            return Err(TicketError::not_found(EntityKind::Ticket, id));
        }
        self.store.ticket_history(id).await
    }
}
