//! Ticketdesk Demo
//!
//! Walks through the ticket workflow end to end:
//! - Ticket creation and status transitions
//! - Comments and the closed-ticket guard
//! - Field edits on a closed ticket
//! - Version history
//! - Cache-aside reads
//!
//! # Usage
//!
//! ```bash
//! # In-memory backends (no infrastructure needed)
//! cargo run --bin demo
//!
//! # PostgreSQL + Redis from DATABASE_URL / REDIS_URL
//! docker compose up -d
//! DEMO_BACKEND=live cargo run --bin demo
//! ```

use std::sync::Arc;
use ticketdesk::{CommentService, Config, TicketService, bootstrap, telemetry};
use ticketdesk_core::environment::SystemClock;
use ticketdesk_core::store::{CommentStore, TicketStore};
use ticketdesk_core::{
    CacheAside, EntityCache, NewComment, NewTicket, TicketError, TicketId, TicketPatch,
    TicketStatus,
};
use ticketdesk_testing::{InMemoryCache, InMemoryStore};
use ticketdesk_web::AppError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("info,ticketdesk=debug,sqlx=warn");

    println!("\n🎫 ============================================");
    println!("   Ticketdesk - Live Demo");
    println!("============================================\n");

    let config = Config::from_env();

    if std::env::var("DEMO_BACKEND").is_ok_and(|backend| backend == "live") {
        println!("⚙️  Connecting to PostgreSQL and Redis...");
        let services = bootstrap::connect(&config).await?;
        println!("✓ Connected\n");
        run(&services.tickets, &services.comments).await?;
    } else {
        println!("⚙️  Using in-memory store and cache\n");
        let store = Arc::new(InMemoryStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let clock = Arc::new(SystemClock);
        let policy = config.service_policy();

        let tickets = TicketService::new(
            Arc::clone(&store),
            CacheAside::new(Arc::clone(&cache), config.ticket_cache_policy()),
            clock.clone(),
        )
        .with_policy(policy);
        let comments = CommentService::new(
            store,
            CacheAside::new(cache, config.comment_cache_policy()),
            clock,
        )
        .with_policy(policy);

        run(&tickets, &comments).await?;
    }

    println!("\n============================================");
    println!("✅ Demo complete");
    println!("============================================\n");
    Ok(())
}

async fn run<S, C>(
    tickets: &TicketService<S, C>,
    comments: &CommentService<S, C>,
) -> Result<(), TicketError>
where
    S: TicketStore + CommentStore,
    C: EntityCache,
{
    println!("📋 Scenario 1: Status workflow");
    let ticket = tickets
        .create(NewTicket::new("Printer on fire", "sam@example.com", "sam"))
        .await?;
    println!("   Created ticket {} ({})", ticket.id, ticket.status);

    let closed = tickets.update(ticket.id, closed_by("agent")).await?;
    println!("   Closed ticket (version {})", closed.version);

    let reopen = tickets
        .update(
            ticket.id,
            TicketPatch::new("sam").with_status(TicketStatus::Open),
        )
        .await;
    report("Reopen closed ticket", reopen.map(|_| ()));

    println!("\n💬 Scenario 2: Comments and the closed-ticket guard");
    let ticket = tickets
        .create(NewTicket::new("Laptop won't boot", "lee@example.com", "lee"))
        .await?;
    let comment = comments
        .create(NewComment::new(
            ticket.id,
            "Black screen after the update",
            "lee@example.com",
            "lee",
        ))
        .await?;
    println!("   Comment {} added", comment.id);

    tickets.update(ticket.id, closed_by("agent")).await?;
    let late = comments
        .create(NewComment::new(ticket.id, "Any news?", "lee@example.com", "lee"))
        .await;
    report("Comment on closed ticket", late.map(|_| ()));

    println!("\n✏️  Scenario 3: Field edit on a closed ticket");
    let edited = tickets
        .update(
            ticket.id,
            TicketPatch::new("agent").with_description("Replaced the SSD"),
        )
        .await;
    report("Edit description", edited.map(|_| ()));

    println!("\n📜 History of {}", ticket.id);
    for version in tickets.history(ticket.id).await? {
        println!(
            "   v{} {} archived at {}",
            version.version, version.snapshot.status, version.archived_at
        );
    }

    println!("\n🔍 Scenario 4: Unknown ticket");
    report("Get unknown ticket", tickets.get(TicketId::new()).await.map(|_| ()));

    println!("\n📄 Scenario 5: Listing");
    let page = tickets.list(0, 10).await?;
    println!("   {} ticket(s) on the first page", page.len());
    report("List with limit 0", tickets.list(0, 0).await.map(|_| ()));

    let first = tickets.get(ticket.id).await?;
    let again = tickets.get(ticket.id).await?;
    println!("\n⚡ Cached read returns the same ticket: {}", first == again);

    Ok(())
}

fn closed_by(actor: &str) -> TicketPatch {
    TicketPatch::new(actor).with_status(TicketStatus::Closed)
}

fn report(step: &str, outcome: Result<(), TicketError>) {
    match outcome {
        Ok(()) => println!("   ✓ {step}: ok"),
        Err(err) => {
            let response = AppError::from(err);
            println!("   ✗ {step}: {} {}", response.status(), response.message());
        }
    }
}
