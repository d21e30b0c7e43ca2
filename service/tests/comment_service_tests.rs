//! Comment service behavior over the in-memory store and cache.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use chrono::Duration;
use std::sync::Arc;
use ticketdesk::{CommentService, ServicePolicy, TicketService};
use ticketdesk_core::cache::entity_key;
use ticketdesk_core::{
    CacheAside, CachePolicy, Comment, CommentId, CommentPatch, EntityKind, NewComment,
    TicketError, TicketId, TicketPatch, TicketStatus, TicketStore,
};
use ticketdesk_testing::fixtures::{self, AGENT, REPORTER, REPORTER_EMAIL};
use ticketdesk_testing::helpers::init_test_tracing;
use ticketdesk_testing::{FixedClock, InMemoryCache, InMemoryStore, test_clock};

struct Harness {
    tickets: TicketService<InMemoryStore, InMemoryCache>,
    comments: CommentService<InMemoryStore, InMemoryCache>,
    store: Arc<InMemoryStore>,
    cache: Arc<InMemoryCache>,
    clock: Arc<FixedClock>,
}

fn harness_with(comment_cache: CachePolicy, policy: ServicePolicy) -> Harness {
    init_test_tracing();
    let store = Arc::new(InMemoryStore::new());
    let cache = Arc::new(InMemoryCache::new());
    let clock = Arc::new(test_clock());

    let tickets = TicketService::new(
        Arc::clone(&store),
        CacheAside::new(Arc::clone(&cache), CachePolicy::default()),
        clock.clone(),
    )
    .with_policy(policy);
    let comments = CommentService::new(
        Arc::clone(&store),
        CacheAside::new(Arc::clone(&cache), comment_cache),
        clock.clone(),
    )
    .with_policy(policy);

    Harness {
        tickets,
        comments,
        store,
        cache,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(CachePolicy::disabled(), ServicePolicy::default())
}

async fn close(h: &Harness, id: TicketId) {
    h.tickets
        .update(id, TicketPatch::new(AGENT).with_status(TicketStatus::Closed))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_comment_rejected_once_ticket_is_closed() {
    let h = harness();
    let ticket = h.tickets.create(fixtures::new_ticket("Router")).await.unwrap();

    let first = h
        .comments
        .create(fixtures::new_comment(ticket.id, "Rebooted it"))
        .await
        .unwrap();
    assert_eq!(first.ticket_id, ticket.id);

    close(&h, ticket.id).await;

    let err = h
        .comments
        .create(fixtures::new_comment(ticket.id, "Still down"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TicketError::TicketStatusNotAllowed {
            status: TicketStatus::Closed
        }
    );
    assert_eq!(h.store.comment_count(), 1);
}

#[tokio::test]
async fn test_comment_rejected_on_ticket_stored_as_closed() {
    let h = harness();
    let ticket = h
        .store
        .insert_ticket(&fixtures::ticket_in(TicketStatus::Closed, h.clock.as_ref()))
        .await
        .unwrap();

    let err = h
        .comments
        .create(fixtures::new_comment(ticket.id, "Reopen please"))
        .await
        .unwrap_err();

    assert!(err.is_not_allowed());
    assert_eq!(h.store.comment_count(), 0);
    assert!(
        h.comments
            .list_for_ticket(ticket.id, 0, 10)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_comment_allowed_in_every_open_status() {
    let h = harness();
    let ticket = h.tickets.create(fixtures::new_ticket("Router")).await.unwrap();

    for status in [TicketStatus::Answered, TicketStatus::WaitAnswer] {
        h.tickets
            .update(ticket.id, TicketPatch::new(AGENT).with_status(status))
            .await
            .unwrap();
        h.comments
            .create(fixtures::new_comment(ticket.id, "Update"))
            .await
            .unwrap();
    }

    assert_eq!(h.store.comment_count(), 2);
}

#[tokio::test]
async fn test_comment_on_unknown_ticket_is_not_found() {
    let h = harness();
    let ticket_id = TicketId::new();

    let err = h
        .comments
        .create(fixtures::new_comment(ticket_id, "Hello?"))
        .await
        .unwrap_err();

    assert_eq!(err, TicketError::not_found(EntityKind::Ticket, ticket_id));
    assert_eq!(h.store.comment_count(), 0);
}

#[tokio::test]
async fn test_invalid_comment_rejected_before_ticket_lookup() {
    let h = harness();
    let reads = h.store.ticket_reads();

    let err = h
        .comments
        .create(NewComment::new(TicketId::new(), "", REPORTER_EMAIL, REPORTER))
        .await
        .unwrap_err();

    assert!(matches!(err, TicketError::Validation(_)));
    assert_eq!(h.store.ticket_reads(), reads);
}

#[tokio::test]
async fn test_get_and_remove_unknown_comment_are_not_found() {
    let h = harness();
    let id = CommentId::new();

    assert_eq!(
        h.comments.get(id).await.unwrap_err(),
        TicketError::not_found(EntityKind::Comment, id)
    );
    assert!(h.comments.remove(id).await.unwrap_err().is_not_found());
    assert!(
        h.comments
            .update(id, CommentPatch::body("Edited", AGENT))
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_list_for_ticket_only_returns_its_comments() {
    let h = harness();
    let printer = h.tickets.create(fixtures::new_ticket("Printer")).await.unwrap();
    let scanner = h.tickets.create(fixtures::new_ticket("Scanner")).await.unwrap();

    for body in ["one", "two", "three"] {
        h.comments
            .create(fixtures::new_comment(printer.id, body))
            .await
            .unwrap();
        h.clock.advance(Duration::seconds(1));
    }
    h.comments
        .create(fixtures::new_comment(scanner.id, "other"))
        .await
        .unwrap();

    let page = h.comments.list_for_ticket(printer.id, 0, 2).await.unwrap();
    let bodies: Vec<_> = page.iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, ["one", "two"]);

    let rest = h.comments.list_for_ticket(printer.id, 1, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].body, "three");

    assert_eq!(h.comments.list(0, 10).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_list_for_unknown_ticket_is_not_found() {
    let h = harness();
    assert!(
        h.comments
            .list_for_ticket(TicketId::new(), 0, 10)
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(matches!(
        h.comments.list(0, 0).await,
        Err(TicketError::Validation(_))
    ));
}

#[tokio::test]
async fn test_update_comment_body() {
    let h = harness();
    let ticket = h.tickets.create(fixtures::new_ticket("Keyboard")).await.unwrap();
    let comment = h
        .comments
        .create(fixtures::new_comment(ticket.id, "Sticky keys"))
        .await
        .unwrap();
    h.clock.advance(Duration::minutes(3));

    let updated = h
        .comments
        .update(comment.id, CommentPatch::body("Sticky space bar", AGENT))
        .await
        .unwrap();

    assert_eq!(updated.body, "Sticky space bar");
    assert_eq!(updated.audit.updated_by, AGENT);
    assert_eq!(
        updated.timestamps.updated_at - comment.timestamps.created_at,
        Duration::minutes(3)
    );
    assert_eq!(h.comments.get(comment.id).await.unwrap(), updated);
}

#[tokio::test]
async fn test_comment_edit_on_closed_ticket_follows_policy() {
    let allowed = harness();
    let forbidding = harness_with(
        CachePolicy::disabled(),
        ServicePolicy {
            allow_edits_on_closed: false,
        },
    );

    for (h, expect_ok) in [(allowed, true), (forbidding, false)] {
        let ticket = h.tickets.create(fixtures::new_ticket("Mouse")).await.unwrap();
        let comment = h
            .comments
            .create(fixtures::new_comment(ticket.id, "Lagging"))
            .await
            .unwrap();
        close(&h, ticket.id).await;

        let result = h
            .comments
            .update(comment.id, CommentPatch::body("Fixed", AGENT))
            .await;
        assert_eq!(result.is_ok(), expect_ok);
        if !expect_ok {
            assert!(result.unwrap_err().is_not_allowed());
            assert_eq!(h.comments.get(comment.id).await.unwrap().body, "Lagging");
        }
    }
}

#[tokio::test]
async fn test_remove_comment() {
    let h = harness();
    let ticket = h.tickets.create(fixtures::new_ticket("Desk")).await.unwrap();
    let comment = h
        .comments
        .create(fixtures::new_comment(ticket.id, "Wobbly"))
        .await
        .unwrap();

    let removed = h.comments.remove(comment.id).await.unwrap();
    assert_eq!(removed, comment);
    assert!(h.comments.get(comment.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_ticket_removal_cascades_to_comments() {
    let h = harness();
    let ticket = h.tickets.create(fixtures::new_ticket("Chair")).await.unwrap();
    let comment = h
        .comments
        .create(fixtures::new_comment(ticket.id, "Squeaks"))
        .await
        .unwrap();

    h.tickets.remove(ticket.id).await.unwrap();

    assert_eq!(h.store.comment_count(), 0);
    assert!(h.comments.get(comment.id).await.unwrap_err().is_not_found());
}

// ============================================================================
// Cache policy
// ============================================================================

#[tokio::test]
async fn test_comments_bypass_cache_by_default() {
    let h = harness();
    let ticket = h.tickets.create(fixtures::new_ticket("Lamp")).await.unwrap();
    let comment = h
        .comments
        .create(fixtures::new_comment(ticket.id, "Flickers"))
        .await
        .unwrap();

    h.comments.get(comment.id).await.unwrap();
    h.comments
        .update(comment.id, CommentPatch::body("Dead", AGENT))
        .await
        .unwrap();

    assert!(!h.cache.contains_key(&entity_key::<Comment>(comment.id)));
    assert_eq!(h.cache.set_count(), 0);
    assert_eq!(h.cache.delete_count(), 0);
}

#[tokio::test]
async fn test_enabled_comment_cache_populates_and_invalidates() {
    let h = harness_with(CachePolicy::default(), ServicePolicy::default());
    let ticket = h.tickets.create(fixtures::new_ticket("Lamp")).await.unwrap();
    let comment = h
        .comments
        .create(fixtures::new_comment(ticket.id, "Flickers"))
        .await
        .unwrap();
    let key = entity_key::<Comment>(comment.id);

    assert_eq!(h.comments.get(comment.id).await.unwrap(), comment);
    assert!(h.cache.contains_key(&key));

    h.comments
        .update(comment.id, CommentPatch::body("Dead", AGENT))
        .await
        .unwrap();
    assert!(!h.cache.contains_key(&key));
    assert_eq!(h.comments.get(comment.id).await.unwrap().body, "Dead");

    h.comments.remove(comment.id).await.unwrap();
    assert!(!h.cache.contains_key(&key));
}

#[tokio::test]
async fn test_store_outage_propagates_to_comments() {
    let h = harness();
    let ticket = h.tickets.create(fixtures::new_ticket("Fan")).await.unwrap();
    h.store.set_unavailable(true);

    assert!(matches!(
        h.comments
            .create(fixtures::new_comment(ticket.id, "Noisy"))
            .await,
        Err(TicketError::StoreUnavailable(_))
    ));
    assert!(matches!(
        h.comments.list_for_ticket(ticket.id, 0, 10).await,
        Err(TicketError::StoreUnavailable(_))
    ));
}
