//! `PostgreSQL` ticket and comment store for Ticketdesk.
//!
//! [`PostgresStore`] implements [`TicketStore`](ticketdesk_core::TicketStore)
//! and [`CommentStore`](ticketdesk_core::CommentStore) over three tables:
//!
//! - `tickets`: current ticket state, with a `version` column for
//!   optimistic concurrency
//! - `comments`: `ticket_id` references `tickets` (`ON DELETE CASCADE`)
//! - `tickets_history`: JSONB snapshots of superseded ticket versions
//!   (`ON DELETE CASCADE`)
//!
//! Every `sqlx::Error` surfaces as
//! [`TicketError::StoreUnavailable`](ticketdesk_core::TicketError::StoreUnavailable).
//!
//! # Example
//!
//! ```no_run
//! use ticketdesk_postgres::PostgresStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresStore::new("postgres://localhost/tickets").await?;
//! store.initialize_schema().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod comments;
mod schema;
mod tickets;

use sqlx::PgPool;
use ticketdesk_core::{Page, Result, TicketError};

pub use schema::SCHEMA;

/// `PostgreSQL`-backed store for tickets, comments and ticket history.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to `database_url` with a default pool.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StoreUnavailable`] if the connection fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| db_error("connect", &e))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist.
    ///
    /// Idempotent. Intended for tests and local runs; deployments manage
    /// the schema out of band.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::StoreUnavailable`] if a statement fails.
    pub async fn initialize_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("initialize schema", &e))?;
        }
        tracing::info!(statements = SCHEMA.len(), "Ticket schema initialized");
        Ok(())
    }
}

fn db_error(action: &str, e: &sqlx::Error) -> TicketError {
    metrics::counter!("store.error").increment(1);
    TicketError::StoreUnavailable(format!("Failed to {action}: {e}"))
}

fn decode_error(column: &str, e: &sqlx::Error) -> TicketError {
    TicketError::Serialization(format!("Failed to decode column `{column}`: {e}"))
}

fn page_bounds(page: Page) -> Result<(i64, i64)> {
    let offset = i64::try_from(page.offset())
        .map_err(|_| TicketError::Validation(format!("offset out of range: {}", page.offset())))?;
    Ok((i64::from(page.limit()), offset))
}
