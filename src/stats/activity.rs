//! Per-account and system-wide activity summaries.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clock::Clock;
use crate::error::CoreError;
use crate::model::AccountId;
use crate::store::{AccountStore, SessionStore};
use crate::usage::UsageAggregator;

/// Activity tier derived from an account's lifetime login count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    /// No logins at all.
    Inactive,
    /// 1 to 5 logins.
    Low,
    /// 6 to 20 logins.
    Medium,
    /// More than 20 logins.
    High,
}

impl ActivityLevel {
    /// Tier for a lifetime login count.
    pub fn from_login_count(count: u64) -> Self {
        match count {
            0 => Self::Inactive,
            1..=5 => Self::Low,
            6..=20 => Self::Medium,
            _ => Self::High,
        }
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Inactive => "inactive",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

/// Lifetime activity summary of one account.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    /// The account.
    pub account_id: AccountId,
    /// Count of all sessions, open or closed.
    pub login_count: u64,
    /// Lifetime online time in hours (open sessions counted up to now),
    /// rounded to 2 decimals.
    pub total_online_hours: f64,
    /// Count of closed sessions.
    pub completed_sessions: u64,
    /// Count of currently open sessions.
    pub active_sessions: u64,
    /// Mean closed-session length in hours, 0 when none, rounded to 2
    /// decimals.
    pub average_session_hours: f64,
    /// Length of the longest closed session in hours, rounded to 2
    /// decimals; `None` when the account has no closed sessions.
    pub longest_session_hours: Option<f64>,
    /// Login instant of that longest closed session.
    pub longest_session_date: Option<DateTime<Utc>>,
    /// Most recent login instant; `None` when the account never logged in.
    pub last_login_time: Option<DateTime<Utc>>,
    /// Tier derived from `login_count`.
    pub activity_level: ActivityLevel,
}

/// System-wide login summary over a half-open date range `[start, end)`.
#[derive(Debug, Clone, Serialize)]
pub struct SystemReport {
    /// Range start (inclusive).
    pub start: DateTime<Utc>,
    /// Range end (exclusive).
    pub end: DateTime<Utc>,
    /// Sessions opened in the range.
    pub total_logins: u64,
    /// Distinct accounts among them.
    pub unique_users: u64,
    /// `total_logins / max(1, whole days in range)`, rounded to 2 decimals.
    pub average_daily_logins: f64,
    /// Account with the most logins in range; ties go to the account whose
    /// session appears first. `None` when the range is empty.
    pub most_active_user: Option<AccountId>,
}

/// Read-only dashboard summaries composed from the session log.
///
/// Each report is an independent snapshot; reports taken back to back are
/// not mutually consistent at a single instant.
pub struct StatisticsRollup<S, A, C> {
    accounts: Arc<A>,
    store: Arc<S>,
    usage: UsageAggregator<S, C>,
}

impl<S, A, C> StatisticsRollup<S, A, C>
where
    S: SessionStore,
    A: AccountStore,
    C: Clock,
{
    /// Create a rollup over the given stores and clock.
    pub fn new(accounts: Arc<A>, sessions: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            accounts,
            store: Arc::clone(&sessions),
            usage: UsageAggregator::new(sessions, clock),
        }
    }

    /// Lifetime activity summary for one account.
    ///
    /// Fails with [`CoreError::NotFound`] when the account does not exist.
    pub async fn account_activity_report(
        &self,
        account_id: AccountId,
    ) -> Result<ActivityReport, CoreError> {
        self.accounts.get(account_id).await?;

        let sessions = self.store.find_by_account(account_id).await?;
        let login_count = sessions.len() as u64;
        let completed: Vec<_> = sessions.iter().filter(|s| !s.is_open()).collect();
        let completed_sessions = completed.len() as u64;
        let active_sessions = login_count - completed_sessions;

        let total_seconds = self.usage.total_usage(account_id).await?;
        let total_online_hours = round2(total_seconds as f64 / 3600.0);

        let durations: Vec<(i64, DateTime<Utc>)> = completed
            .iter()
            .filter_map(|s| {
                s.logout_time
                    .map(|out| ((out - s.login_time).num_seconds().max(0), s.login_time))
            })
            .collect();
        let completed_hours: f64 = durations
            .iter()
            .map(|(secs, _)| *secs as f64 / 3600.0)
            .sum();
        let average_session_hours = if completed_sessions > 0 {
            round2(completed_hours / completed_sessions as f64)
        } else {
            0.0
        };
        let longest = durations.iter().max_by_key(|(secs, _)| *secs).copied();

        Ok(ActivityReport {
            account_id,
            login_count,
            total_online_hours,
            completed_sessions,
            active_sessions,
            average_session_hours,
            longest_session_hours: longest.map(|(secs, _)| round2(secs as f64 / 3600.0)),
            longest_session_date: longest.map(|(_, login)| login),
            last_login_time: sessions.iter().map(|s| s.login_time).max(),
            activity_level: ActivityLevel::from_login_count(login_count),
        })
    }

    /// System-wide login summary over `[start, end)`.
    pub async fn system_activity_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<SystemReport, CoreError> {
        let sessions = self.store.find_by_login_time_range(start, end).await?;

        let total_logins = sessions.len() as u64;
        let unique_users = sessions
            .iter()
            .map(|s| s.account_id)
            .collect::<HashSet<_>>()
            .len() as u64;

        let days = (end - start).num_days().max(1);
        let average_daily_logins = round2(total_logins as f64 / days as f64);

        let mut counts: HashMap<AccountId, u64> = HashMap::new();
        for session in &sessions {
            *counts.entry(session.account_id).or_default() += 1;
        }

        // Tie-break by first-encountered session order, which the store
        // contract makes deterministic (ascending login time).
        let mut most_active_user: Option<(AccountId, u64)> = None;
        let mut seen = HashSet::new();
        for session in &sessions {
            if !seen.insert(session.account_id) {
                continue;
            }
            let count = counts[&session.account_id];
            if most_active_user.is_none_or(|(_, best)| count > best) {
                most_active_user = Some((session.account_id, count));
            }
        }

        Ok(SystemReport {
            start,
            end,
            total_logins,
            unique_users,
            average_daily_logins,
            most_active_user: most_active_user.map(|(id, _)| id),
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
