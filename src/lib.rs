//! Subscriber session lifecycle tracking and time-quota accounting.
//!
//! This crate tracks login/logout sessions per subscriber account, converts
//! accumulated connection time into quota consumption against a purchased
//! time package, and derives activity statistics. It is a library boundary:
//! credential checks, HTTP routing, and account/package CRUD live in the
//! caller.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use telecom_sessions::{Clock, ManualClock, MemorySessionStore, SessionTracker};
//!
//! # async fn example() -> Result<(), telecom_sessions::CoreError> {
//! let store = Arc::new(MemorySessionStore::new());
//! let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
//! let tracker = SessionTracker::new(store, Arc::clone(&clock));
//!
//! let session = tracker.record_login(42).await?;
//! assert!(session.is_open());
//!
//! clock.advance(chrono::Duration::minutes(30));
//! let closed = tracker.record_logout(42).await?;
//! assert_eq!(closed.elapsed_seconds(clock.now()), 30 * 60);
//! # Ok(())
//! # }
//! ```
//!
//! For durable storage swap in the SQL backend from [`sql`]; quota answers
//! come from [`QuotaEvaluator`] and dashboard numbers from [`stats`].

pub mod audit;
mod clock;
mod error;
mod model;
mod quota;
pub mod sql;
pub mod stats;
pub mod store;
mod tracker;
mod usage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CoreError;
pub use model::{Account, AccountId, Package, Session, SessionKey};
pub use quota::{
    format_duration_text, parse_granted_duration, QuotaEvaluator, QuotaReport, QuotaStatus,
};
pub use stats::{
    ActivityLevel, ActivityReport, HourBucket, HourlyActivityAggregator, StatisticsRollup,
    SystemReport,
};
pub use store::{
    AccountStore, MemoryAccountStore, MemoryPackageStore, MemorySessionStore, PackageStore,
    SessionStore,
};
pub use tracker::SessionTracker;
pub use usage::UsageAggregator;
