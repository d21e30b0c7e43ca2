//! # Ticketdesk Testing
//!
//! Test doubles and fixtures for the Ticketdesk service.
//!
//! This crate provides:
//! - [`FixedClock`]: deterministic, manually advanced time
//! - [`InMemoryStore`]: `TicketStore` + `CommentStore` with failure injection
//! - [`InMemoryCache`] / [`FailingCache`]: `EntityCache` doubles
//! - [`fixtures`]: valid request builders
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use ticketdesk_core::{CacheAside, CachePolicy, TicketStore};
//! use ticketdesk_testing::{InMemoryCache, InMemoryStore, fixtures, test_clock};
//!
//! # async fn example() -> ticketdesk_core::Result<()> {
//! let store = InMemoryStore::new();
//! let cache = CacheAside::new(Arc::new(InMemoryCache::new()), CachePolicy::default());
//! let clock = test_clock();
//!
//! let ticket = fixtures::ticket(&clock);
//! store.insert_ticket(&ticket).await?;
//! assert_eq!(store.ticket_count(), 1);
//! # Ok(())
//! # }
//! ```

mod cache_mocks;
pub mod fixtures;
mod store_mocks;

use chrono::{DateTime, Utc};
use ticketdesk_core::environment::Clock;

pub use cache_mocks::{FailingCache, InMemoryCache};
pub use store_mocks::InMemoryStore;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, RwLock};

    /// Fixed clock for deterministic tests
    ///
    /// Returns the same instant until [`FixedClock::advance`] moves it.
    /// Clones share the same instant.
    ///
    /// # Example
    ///
    /// ```
    /// use ticketdesk_testing::mocks::FixedClock;
    /// use ticketdesk_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// assert_eq!(time1, clock.now());
    ///
    /// clock.advance(Duration::minutes(5));
    /// assert_eq!(clock.now() - time1, Duration::minutes(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<RwLock<DateTime<Utc>>>,
    }

    #[allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(RwLock::new(time)),
            }
        }

        /// Move the clock forward by `by`.
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.write().unwrap();
            *time += by;
        }
    }

    #[allow(clippy::unwrap_used)]
    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.read().unwrap()
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Test helpers.
pub mod helpers {
    /// Route `tracing` output through the test harness writer.
    ///
    /// Safe to call from every test; only the first call installs the
    /// subscriber. Honors `RUST_LOG`, defaulting to `debug`.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "debug".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = test_clock();
        let other = clock.clone();
        other.advance(chrono::Duration::seconds(30));
        assert_eq!(clock.now(), other.now());
    }
}
