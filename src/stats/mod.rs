//! Activity statistics over the session log.
//!
//! Two read paths:
//!
//! - [`HourlyActivityAggregator`] — 24-slot hour-of-day online distribution
//! - [`StatisticsRollup`] — per-account and system-wide summaries
//!
//! All reports are read-only snapshots without cross-read consistency;
//! concurrent writes may be partially reflected. Good enough for
//! dashboards, not for enforcement.

mod activity;
mod hourly;

pub use activity::{ActivityLevel, ActivityReport, StatisticsRollup, SystemReport};
pub use hourly::{HourBucket, HourlyActivityAggregator};
