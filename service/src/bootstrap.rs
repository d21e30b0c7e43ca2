//! Wiring of the production backends.
//!
//! [`connect`] turns a [`Config`] into ready services: it opens the
//! `PostgreSQL` pool, applies the schema, connects to Redis and hands both
//! to the ticket and comment services with the configured policies.
//!
//! ```rust,ignore
//! let config = Config::from_env();
//! let services = bootstrap::connect(&config).await?;
//! let ticket = services.tickets.get(id).await?;
//! ```

use crate::config::Config;
use crate::services::{CommentService, TicketService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use ticketdesk_core::environment::{Clock, SystemClock};
use ticketdesk_core::{CacheAside, CacheError, TicketError};
use ticketdesk_postgres::PostgresStore;
use ticketdesk_redis::RedisEntityCache;
use tracing::info;

/// Failure to bring up a backend.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The database pool could not be opened
    #[error("Failed to connect to PostgreSQL: {0}")]
    Connect(#[from] sqlx::Error),

    /// The schema could not be applied
    #[error("Failed to initialize schema: {0}")]
    Schema(#[from] TicketError),

    /// Redis could not be reached
    #[error("Failed to connect to Redis: {0}")]
    Cache(#[from] CacheError),
}

/// Ticket service over the production backends.
pub type Tickets = TicketService<PostgresStore, RedisEntityCache>;

/// Comment service over the production backends.
pub type Comments = CommentService<PostgresStore, RedisEntityCache>;

/// Services sharing one pool and one Redis connection.
#[derive(Clone)]
pub struct Services {
    /// Ticket operations
    pub tickets: Tickets,
    /// Comment operations
    pub comments: Comments,
    /// The underlying store, for health checks and shutdown
    pub store: Arc<PostgresStore>,
}

/// Connect every backend named in `config`.
///
/// # Errors
///
/// Returns [`BootstrapError`] if `PostgreSQL` or Redis is unreachable, or if
/// the schema cannot be applied.
pub async fn connect(config: &Config) -> Result<Services, BootstrapError> {
    info!(
        max_connections = config.postgres.max_connections,
        "Connecting to PostgreSQL..."
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .acquire_timeout(Duration::from_secs(config.postgres.connect_timeout))
        .connect(&config.postgres.url)
        .await?;

    let store = Arc::new(PostgresStore::from_pool(pool));
    store.initialize_schema().await?;
    info!("PostgreSQL connected");

    let cache = Arc::new(RedisEntityCache::new(&config.redis.url).await?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let policy = config.service_policy();

    let tickets = TicketService::new(
        Arc::clone(&store),
        CacheAside::new(Arc::clone(&cache), config.ticket_cache_policy()),
        Arc::clone(&clock),
    )
    .with_policy(policy);

    let comments = CommentService::new(
        Arc::clone(&store),
        CacheAside::new(cache, config.comment_cache_policy()),
        clock,
    )
    .with_policy(policy);

    info!(
        ticket_cache = config.cache.tickets_enabled,
        comment_cache = config.cache.comments_enabled,
        ttl_seconds = config.cache.expire_in_seconds,
        "Services ready"
    );

    Ok(Services {
        tickets,
        comments,
        store,
    })
}
