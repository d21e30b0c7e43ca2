//! Tests for the in-memory store and cache doubles

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use chrono::Duration;
use proptest::prelude::*;
use std::time::Duration as StdDuration;
use ticketdesk_core::environment::Clock;
use ticketdesk_core::{
    CommentStore, EntityCache, Page, TicketError, TicketPatch, TicketStatus, TicketStore,
};
use ticketdesk_testing::helpers::init_test_tracing;
use ticketdesk_testing::{FailingCache, InMemoryCache, InMemoryStore, fixtures, test_clock};

#[tokio::test]
async fn test_pages_follow_creation_order() {
    init_test_tracing();
    let store = InMemoryStore::new();
    let clock = test_clock();
    let mut created = Vec::new();
    for _ in 0..5 {
        let ticket = fixtures::ticket(&clock);
        store.insert_ticket(&ticket).await.unwrap();
        created.push(ticket);
        clock.advance(Duration::minutes(1));
    }

    let page = store.find_ticket_page(Page::new(1, 2).unwrap()).await.unwrap();
    assert_eq!(page, created[2..4].to_vec());

    let past_end = store.find_ticket_page(Page::new(3, 2).unwrap()).await.unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn test_stale_update_conflicts_and_writes_nothing() {
    let store = InMemoryStore::new();
    let clock = test_clock();
    let original = store.insert_ticket(&fixtures::ticket(&clock)).await.unwrap();

    let first = original
        .patched(&TicketPatch::new("a").with_title("First"), clock.now())
        .unwrap();
    store.update_ticket(&original, &first).await.unwrap();

    let stale = original
        .patched(&TicketPatch::new("b").with_title("Stale"), clock.now())
        .unwrap();
    let result = store.update_ticket(&original, &stale).await;

    assert_eq!(
        result,
        Err(TicketError::VersionConflict {
            id: original.id,
            expected: 1
        })
    );
    assert_eq!(store.ticket(original.id).unwrap().title, "First");
    assert_eq!(store.ticket_history(original.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_ticket_cascades() {
    let store = InMemoryStore::new();
    let clock = test_clock();
    let ticket = store.insert_ticket(&fixtures::ticket(&clock)).await.unwrap();
    let comment = store
        .insert_comment(&fixtures::comment(ticket.id, &clock))
        .await
        .unwrap();
    let answered = ticket.patched(
        &TicketPatch::new("a").with_status(TicketStatus::Answered),
        clock.now(),
    )
    .unwrap();
    store.update_ticket(&ticket, &answered).await.unwrap();

    let removed = store.delete_ticket(ticket.id).await.unwrap();

    assert_eq!(removed, Some(answered));
    assert_eq!(store.find_comment(comment.id).await.unwrap(), None);
    assert!(store.ticket_history(ticket.id).await.unwrap().is_empty());
    assert_eq!(store.comment_count(), 0);
}

#[tokio::test]
async fn test_comment_requires_existing_ticket() {
    let store = InMemoryStore::new();
    let clock = test_clock();
    let orphan = fixtures::comment(ticketdesk_core::TicketId::new(), &clock);

    let result = store.insert_comment(&orphan).await;

    assert!(matches!(result, Err(TicketError::NotFound { .. })));
}

#[tokio::test]
async fn test_unavailable_store_fails_every_call() {
    let store = InMemoryStore::new();
    let clock = test_clock();
    store.set_unavailable(true);

    let result = store.insert_ticket(&fixtures::ticket(&clock)).await;
    assert!(matches!(result, Err(TicketError::StoreUnavailable(_))));

    store.set_unavailable(false);
    assert!(store.find_ticket_page(Page::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cache_expired_entries_read_as_misses() {
    let cache = InMemoryCache::new();
    cache
        .set("ticket:1", b"x".to_vec(), StdDuration::from_secs(300))
        .await
        .unwrap();
    assert_eq!(cache.get("ticket:1").await.unwrap(), Some(b"x".to_vec()));

    cache.expire("ticket:1");

    assert_eq!(cache.get("ticket:1").await.unwrap(), None);
    assert!(!cache.contains_key("ticket:1"));
}

#[tokio::test]
async fn test_failing_cache_counts_attempts() {
    let cache = FailingCache::new();
    assert!(cache.get("k").await.is_err());
    assert!(cache.delete("k").await.is_err());
    assert_eq!(cache.calls(), 2);
}

proptest! {
    #[test]
    fn prop_ticket_pages_slice_creation_order(
        count in 0usize..12,
        skip in 0u32..8,
        limit in 1u32..6,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        runtime.block_on(async {
            let store = InMemoryStore::new();
            let clock = test_clock();
            let mut created = Vec::new();
            for _ in 0..count {
                let ticket = fixtures::ticket(&clock);
                store.insert_ticket(&ticket).await.unwrap();
                created.push(ticket);
                clock.advance(Duration::seconds(1));
            }

            let page = store
                .find_ticket_page(Page::new(skip, limit).unwrap())
                .await
                .unwrap();

            let start = usize::try_from(skip * limit).unwrap().min(count);
            let end = (start + usize::try_from(limit).unwrap()).min(count);
            assert_eq!(page, created[start..end].to_vec());
        });
    }
}
