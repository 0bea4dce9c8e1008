//! Domain value types shared by all store backends.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Subscriber account identifier. Uses `i64` to match DB column types.
pub type AccountId = i64;

/// Composite identity of a [`Session`]: `(account_id, login_time)`.
///
/// Stores index sessions by this key instead of relying on a storage-native
/// composite-key mechanism. It is `Ord` so ordered maps can range-scan all
/// sessions of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SessionKey {
    /// Owning account.
    pub account_id: AccountId,
    /// Instant the session was opened.
    pub login_time: DateTime<Utc>,
}

/// One login-to-logout interval for an account.
///
/// `logout_time == None` means the session is open and the account is
/// online. The key fields are immutable once created; `logout_time` is
/// written exactly once by the tracker. Sessions are never deleted by the
/// core (append-only log).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Owning account.
    pub account_id: AccountId,
    /// Instant the session was opened (part of the identity).
    pub login_time: DateTime<Utc>,
    /// Instant the session was closed; `None` while online.
    pub logout_time: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a new open session.
    #[inline]
    pub fn new(account_id: AccountId, login_time: DateTime<Utc>) -> Self {
        Self {
            account_id,
            login_time,
            logout_time: None,
        }
    }

    /// The composite identity of this session.
    #[inline]
    pub fn key(&self) -> SessionKey {
        SessionKey {
            account_id: self.account_id,
            login_time: self.login_time,
        }
    }

    /// Whether the session is still open (account online).
    #[inline]
    pub fn is_open(&self) -> bool {
        self.logout_time.is_none()
    }

    /// Elapsed seconds of this session, treating an open session as ending
    /// at `now`. Never negative.
    #[inline]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        let end = self.logout_time.unwrap_or(now);
        (end - self.login_time).num_seconds().max(0)
    }
}

/// Subscriber account, read-only to the core. Owned and mutated by the
/// out-of-scope account service.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    /// Account identifier.
    pub account_id: AccountId,
    /// Current balance; carried through for reports, never computed on.
    pub balance: f64,
    /// Identifier of the currently active package.
    pub package_id: i64,
    /// Instant the current package became active. Quota usage is scoped
    /// to sessions opened at or after this instant.
    pub package_start_time: DateTime<Utc>,
}

/// Purchased time package, read-only to the core.
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    /// Package identifier.
    pub package_id: i64,
    /// Granted duration as human text, e.g. `"100 hours"`.
    pub duration: String,
    /// Package cost; carried through for reports only.
    pub cost: f64,
}
