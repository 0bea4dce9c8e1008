//! Quota evaluation against a purchased time package.

use std::sync::Arc;

use serde::Serialize;

use crate::clock::Clock;
use crate::error::CoreError;
use crate::model::AccountId;
use crate::store::{AccountStore, PackageStore, SessionStore};
use crate::usage::UsageAggregator;

/// Quota standing of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaStatus {
    /// Remaining time is non-negative.
    Normal,
    /// Granted time has been used up.
    Expired,
}

impl std::fmt::Display for QuotaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::Expired => f.write_str("expired"),
        }
    }
}

/// Remaining-time answer for one account.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaReport {
    /// Seconds granted by the active package.
    pub granted_seconds: i64,
    /// Seconds consumed since the package start.
    pub used_seconds: i64,
    /// Granted minus used; negative when over quota.
    pub remaining_seconds: i64,
    /// `Expired` iff `remaining_seconds < 0`.
    pub status: QuotaStatus,
    /// Human-readable used duration.
    pub used_text: String,
    /// Human-readable remaining duration (absolute value when negative).
    pub remaining_text: String,
}

/// Combines a package's granted duration with aggregated usage.
pub struct QuotaEvaluator<S, A, P, C> {
    accounts: Arc<A>,
    packages: Arc<P>,
    usage: UsageAggregator<S, C>,
}

impl<S, A, P, C> QuotaEvaluator<S, A, P, C>
where
    S: SessionStore,
    A: AccountStore,
    P: PackageStore,
    C: Clock,
{
    /// Create an evaluator over the given stores and clock.
    pub fn new(accounts: Arc<A>, packages: Arc<P>, sessions: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            accounts,
            packages,
            usage: UsageAggregator::new(sessions, clock),
        }
    }

    /// Remaining time of an account against its active package.
    ///
    /// Usage is scoped to the current billing period: only sessions opened
    /// at or after the account's package start time count. Fails with
    /// [`CoreError::NotFound`] when the account or its package is missing,
    /// and [`CoreError::Validation`] when the package grant text cannot be
    /// parsed.
    pub async fn remaining_time(&self, account_id: AccountId) -> Result<QuotaReport, CoreError> {
        let account = self.accounts.get(account_id).await?;
        let package = self.packages.get(account.package_id).await?;

        let granted_seconds = parse_granted_duration(&package.duration)?;
        let used_seconds = self
            .usage
            .usage_since(account_id, account.package_start_time)
            .await?;
        let remaining_seconds = granted_seconds - used_seconds;

        let status = if remaining_seconds < 0 {
            QuotaStatus::Expired
        } else {
            QuotaStatus::Normal
        };

        Ok(QuotaReport {
            granted_seconds,
            used_seconds,
            remaining_seconds,
            status,
            used_text: format_duration_text(used_seconds),
            remaining_text: format_duration_text(remaining_seconds.abs()),
        })
    }
}

/// Parse a package grant like `"100 hours"` into seconds.
///
/// The pattern is a non-negative integer followed by a unit keyword. Only
/// the hour unit is supported; anything else fails with
/// [`CoreError::Validation`] rather than being silently defaulted.
pub fn parse_granted_duration(text: &str) -> Result<i64, CoreError> {
    let mut parts = text.split_whitespace();

    let amount = parts
        .next()
        .ok_or_else(|| CoreError::validation("empty package duration"))?;
    let unit = parts.next().ok_or_else(|| {
        CoreError::validation(format!("package duration {text:?} is missing a unit"))
    })?;
    if parts.next().is_some() {
        return Err(CoreError::validation(format!(
            "package duration {text:?} has trailing tokens"
        )));
    }

    let hours: i64 = amount.parse().map_err(|_| {
        CoreError::validation(format!("invalid duration amount {amount:?} in {text:?}"))
    })?;
    if hours < 0 {
        return Err(CoreError::validation(format!(
            "negative duration amount in {text:?}"
        )));
    }

    match unit {
        "hours" | "hour" => hours.checked_mul(3600).ok_or_else(|| {
            CoreError::validation(format!("duration amount overflows in {text:?}"))
        }),
        other => Err(CoreError::validation(format!(
            "unsupported duration unit {other:?} in {text:?}"
        ))),
    }
}

/// Format seconds as human text.
///
/// Under an hour: `"<n> seconds"`. Whole hours: `"<h> hours"`. Otherwise
/// `"<h> hours <m> minutes"` with minutes truncated — a non-whole number of
/// hours keeps the minutes part even when it truncates to zero.
pub fn format_duration_text(seconds: i64) -> String {
    if seconds < 3600 {
        return format!("{seconds} seconds");
    }
    let hours = seconds / 3600;
    if seconds % 3600 == 0 {
        format!("{hours} hours")
    } else {
        let minutes = (seconds % 3600) / 60;
        format!("{hours} hours {minutes} minutes")
    }
}
