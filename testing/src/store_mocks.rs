//! In-memory store for fast, deterministic service tests.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use ticketdesk_core::store::{CommentStore, TicketStore};
use ticketdesk_core::{
    Comment, CommentId, EntityKind, Page, Result, Ticket, TicketError, TicketId, TicketVersion,
};

#[derive(Debug, Default)]
struct Tables {
    tickets: HashMap<TicketId, Ticket>,
    comments: HashMap<CommentId, Comment>,
    history: HashMap<TicketId, Vec<TicketVersion>>,
}

/// In-memory [`TicketStore`] and [`CommentStore`].
///
/// Mirrors the `PostgreSQL` store's observable behavior: pages ordered by
/// `(created_at, id)`, optimistic concurrency on ticket `version`, history
/// archived on update, cascading ticket deletes, and `NotFound` for comments
/// on a missing ticket.
///
/// [`InMemoryStore::set_unavailable`] makes every call fail with
/// [`TicketError::StoreUnavailable`]. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    unavailable: Arc<AtomicBool>,
    ticket_reads: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (`true`) or succeed again (`false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored tickets
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.tables.read().unwrap().tickets.len()
    }

    /// Number of stored comments
    #[must_use]
    pub fn comment_count(&self) -> usize {
        self.tables.read().unwrap().comments.len()
    }

    /// Number of `find_ticket` calls served so far.
    ///
    /// Lets tests tell cache hits from store reads.
    #[must_use]
    pub fn ticket_reads(&self) -> usize {
        self.ticket_reads.load(Ordering::SeqCst)
    }

    /// Stored ticket, bypassing availability checks and counters.
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<Ticket> {
        self.tables.read().unwrap().tickets.get(&id).cloned()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TicketError::StoreUnavailable(
                "in-memory store marked unavailable".into(),
            ));
        }
        Ok(())
    }
}

type SortKey = (DateTime<Utc>, [u8; 16]);

/// Apply `ORDER BY created_at, id LIMIT .. OFFSET ..` to `rows`.
fn page_of<T: Clone>(mut rows: Vec<&T>, page: Page, sort_key: fn(&T) -> SortKey) -> Vec<T> {
    rows.sort_by_key(|row| sort_key(row));
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    rows.into_iter()
        .skip(offset)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

fn ticket_sort_key(ticket: &Ticket) -> SortKey {
    (ticket.timestamps.created_at, *ticket.id.as_uuid().as_bytes())
}

fn comment_sort_key(comment: &Comment) -> SortKey {
    (comment.timestamps.created_at, *comment.id.as_uuid().as_bytes())
}

impl TicketStore for InMemoryStore {
    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        self.check_available()?;
        self.ticket_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.ticket(id))
    }

    async fn find_ticket_page(&self, page: Page) -> Result<Vec<Ticket>> {
        self.check_available()?;
        let tables = self.tables.read().unwrap();
        Ok(page_of(tables.tickets.values().collect(), page, ticket_sort_key))
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<Ticket> {
        self.check_available()?;
        self.tables
            .write()
            .unwrap()
            .tickets
            .insert(ticket.id, ticket.clone());
        Ok(ticket.clone())
    }

    async fn update_ticket(&self, previous: &Ticket, updated: &Ticket) -> Result<Ticket> {
        self.check_available()?;
        let mut tables = self.tables.write().unwrap();

        let current = tables
            .tickets
            .get(&previous.id)
            .ok_or_else(|| TicketError::not_found(EntityKind::Ticket, previous.id))?;
        if current.version != previous.version {
            return Err(TicketError::VersionConflict {
                id: previous.id,
                expected: previous.version,
            });
        }

        let archived = TicketVersion::archive(previous, updated.timestamps.updated_at);
        tables.history.entry(previous.id).or_default().push(archived);
        tables.tickets.insert(updated.id, updated.clone());
        Ok(updated.clone())
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        self.check_available()?;
        let mut tables = self.tables.write().unwrap();
        let removed = tables.tickets.remove(&id);
        if removed.is_some() {
            tables.comments.retain(|_, comment| comment.ticket_id != id);
            tables.history.remove(&id);
        }
        Ok(removed)
    }

    async fn ticket_history(&self, id: TicketId) -> Result<Vec<TicketVersion>> {
        self.check_available()?;
        let tables = self.tables.read().unwrap();
        Ok(tables.history.get(&id).cloned().unwrap_or_default())
    }
}

impl CommentStore for InMemoryStore {
    async fn find_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        self.check_available()?;
        Ok(self.tables.read().unwrap().comments.get(&id).cloned())
    }

    async fn find_comment_page(&self, page: Page) -> Result<Vec<Comment>> {
        self.check_available()?;
        let tables = self.tables.read().unwrap();
        Ok(page_of(tables.comments.values().collect(), page, comment_sort_key))
    }

    async fn find_comments_for_ticket(
        &self,
        ticket_id: TicketId,
        page: Page,
    ) -> Result<Vec<Comment>> {
        self.check_available()?;
        let tables = self.tables.read().unwrap();
        let rows = tables
            .comments
            .values()
            .filter(|comment| comment.ticket_id == ticket_id)
            .collect();
        Ok(page_of(rows, page, comment_sort_key))
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<Comment> {
        self.check_available()?;
        let mut tables = self.tables.write().unwrap();
        if !tables.tickets.contains_key(&comment.ticket_id) {
            return Err(TicketError::not_found(EntityKind::Ticket, comment.ticket_id));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment.clone())
    }

    async fn update_comment(&self, comment: &Comment) -> Result<Comment> {
        self.check_available()?;
        let mut tables = self.tables.write().unwrap();
        let slot = tables
            .comments
            .get_mut(&comment.id)
            .ok_or_else(|| TicketError::not_found(EntityKind::Comment, comment.id))?;
        *slot = comment.clone();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        self.check_available()?;
        Ok(self.tables.write().unwrap().comments.remove(&id))
    }
}
