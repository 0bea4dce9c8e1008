//! Usage-duration aggregation over the session log.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::CoreError;
use crate::model::AccountId;
use crate::store::SessionStore;

/// Sums elapsed connection time across an account's sessions.
///
/// An open session is treated as ending "now" (the injected clock), so
/// in-progress time is counted.
pub struct UsageAggregator<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> UsageAggregator<S, C>
where
    S: SessionStore,
    C: Clock,
{
    /// Create an aggregator over the given store and clock.
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Total seconds spent in sessions opened at or after `since`.
    ///
    /// Sessions that began before `since` are excluded entirely — no
    /// partial credit. This scopes usage to a billing period when called
    /// with the account's package start time.
    pub async fn usage_since(
        &self,
        account_id: AccountId,
        since: DateTime<Utc>,
    ) -> Result<i64, CoreError> {
        let now = self.clock.now();
        let sessions = self.store.find_by_account(account_id).await?;

        Ok(sessions
            .iter()
            .filter(|s| s.login_time >= since)
            .map(|s| s.elapsed_seconds(now))
            .sum())
    }

    /// Unscoped lifetime usage in seconds.
    pub async fn total_usage(&self, account_id: AccountId) -> Result<i64, CoreError> {
        self.usage_since(account_id, DateTime::UNIX_EPOCH).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use crate::clock::ManualClock;
    use crate::model::Session;
    use crate::store::MemorySessionStore;

    use super::*;

    fn t(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, min, sec).unwrap()
    }

    async fn closed(store: &MemorySessionStore, id: AccountId, from: DateTime<Utc>, to: DateTime<Utc>) {
        let mut s = Session::new(id, from);
        s.logout_time = Some(to);
        store.insert(s).await.unwrap();
    }

    #[tokio::test]
    async fn sums_closed_session_durations() {
        let store = Arc::new(MemorySessionStore::new());
        let clock = Arc::new(ManualClock::new(t(12, 0, 0)));
        closed(&store, 1, t(9, 0, 0), t(9, 0, 0) + Duration::seconds(3661)).await;

        let usage = UsageAggregator::new(store, clock);
        assert_eq!(usage.usage_since(1, t(9, 0, 0)).await.unwrap(), 3661);
    }

    #[tokio::test]
    async fn excludes_sessions_before_reference_entirely() {
        let store = Arc::new(MemorySessionStore::new());
        let clock = Arc::new(ManualClock::new(t(12, 0, 0)));
        // Straddles the reference instant but gets no partial credit.
        closed(&store, 1, t(8, 0, 0), t(10, 0, 0)).await;
        closed(&store, 1, t(10, 0, 0), t(10, 30, 0)).await;

        let usage = UsageAggregator::new(store, clock);
        assert_eq!(usage.usage_since(1, t(9, 0, 0)).await.unwrap(), 1800);
    }

    #[tokio::test]
    async fn open_session_counts_until_now() {
        let store = Arc::new(MemorySessionStore::new());
        let clock = Arc::new(ManualClock::new(t(9, 10, 0)));
        store.insert(Session::new(1, t(9, 0, 0))).await.unwrap();

        let usage = UsageAggregator::new(Arc::clone(&store), Arc::clone(&clock));
        assert_eq!(usage.usage_since(1, t(9, 0, 0)).await.unwrap(), 600);

        clock.advance(Duration::minutes(5));
        assert_eq!(usage.usage_since(1, t(9, 0, 0)).await.unwrap(), 900);
    }

    #[tokio::test]
    async fn total_usage_mixes_closed_and_open() {
        // Two closed sessions of 30 and 90 minutes plus one open session
        // started 10 minutes ago: 130 minutes total.
        let store = Arc::new(MemorySessionStore::new());
        let clock = Arc::new(ManualClock::new(t(14, 10, 0)));
        closed(&store, 2, t(8, 0, 0), t(8, 30, 0)).await;
        closed(&store, 2, t(10, 0, 0), t(11, 30, 0)).await;
        store.insert(Session::new(2, t(14, 0, 0))).await.unwrap();

        let usage = UsageAggregator::new(store, clock);
        assert_eq!(usage.total_usage(2).await.unwrap(), 130 * 60);
    }

    #[tokio::test]
    async fn no_sessions_is_zero() {
        let store = Arc::new(MemorySessionStore::new());
        let clock = Arc::new(ManualClock::new(t(12, 0, 0)));

        let usage = UsageAggregator::new(store, clock);
        assert_eq!(usage.total_usage(99).await.unwrap(), 0);
    }
}
