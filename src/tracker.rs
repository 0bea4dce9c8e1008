//! Session lifecycle tracking.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::CoreError;
use crate::model::{AccountId, Session};
use crate::store::SessionStore;

/// Maximum insert attempts before a key collision becomes fatal.
const MAX_INSERT_ATTEMPTS: u32 = 5;

/// Opens and closes sessions in a [`SessionStore`].
///
/// "At most one open session per account" is a desired invariant, not a
/// storage-enforced one: two concurrent logins can both observe "no open
/// session" and both insert. The tracker keeps that assumption in a single
/// place ([`latest_open_session`](Self::latest_open_session)) so a stricter
/// store-level constraint can replace it without touching the entry points.
///
/// # Type parameters
///
/// - `S` — the session log backend
/// - `C` — the time source (pin a [`ManualClock`](crate::ManualClock) in tests)
pub struct SessionTracker<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> SessionTracker<S, C>
where
    S: SessionStore,
    C: Clock,
{
    /// Create a tracker over the given store and clock.
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Record a login for an account, returning the open session.
    ///
    /// Idempotent: when an open session already exists it is returned
    /// unchanged, so rapid repeated logins don't produce duplicate rows.
    /// A failing open-session lookup does not block login; it is logged and
    /// a new session is created anyway.
    ///
    /// Insertion uses the `(account_id, login_time)` composite key. When
    /// the store reports a key collision (clock resolution coarser than the
    /// call frequency), the candidate login time is bumped by one
    /// millisecond and the insert retried, up to 5 attempts; exhausting
    /// them surfaces [`CoreError::Conflict`].
    pub async fn record_login(&self, account_id: AccountId) -> Result<Session, CoreError> {
        match self.latest_open_session(account_id).await {
            Ok(Some(session)) => return Ok(session),
            Ok(None) => {}
            Err(error) => {
                warn!(account_id, %error, "open-session lookup failed, creating a new session");
            }
        }

        let mut login_time = self.clock.now();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.insert(Session::new(account_id, login_time)).await {
                Ok(session) => return Ok(session),
                Err(CoreError::Conflict(_)) if attempt < MAX_INSERT_ATTEMPTS => {
                    debug!(account_id, attempt, "session key collision, bumping login time");
                    login_time += Duration::milliseconds(1);
                }
                Err(CoreError::Conflict(_)) => {
                    return Err(CoreError::Conflict(format!(
                        "login for account {account_id} exhausted {MAX_INSERT_ATTEMPTS} key-collision retries"
                    )));
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Record a logout for an account, returning the closed session.
    ///
    /// Fails with [`CoreError::NotFound`] when no open session exists. When
    /// more than one is open (a violated invariant) only the most recently
    /// opened one is closed; the others stay open and are reported via a
    /// warning rather than silently fixed.
    pub async fn record_logout(&self, account_id: AccountId) -> Result<Session, CoreError> {
        let latest = self
            .latest_open_session(account_id)
            .await?
            .ok_or_else(|| {
                CoreError::not_found(format!("no active session for account {account_id}"))
            })?;

        let now = self.clock.now();
        self.store.update_logout(latest.key(), now).await?;

        Ok(Session {
            logout_time: Some(now),
            ..latest
        })
    }

    /// Close every open session of an account at the current instant.
    ///
    /// Administrative reconciliation; a no-op when the account has no open
    /// sessions.
    ///
    /// Closes are issued per session without a cross-record transaction
    /// (see the [`SessionStore`] contract), so a backend failure midway
    /// can leave some sessions closed and others still open. The call is
    /// safe to retry: already-closed sessions are no longer open and are
    /// not touched again.
    pub async fn force_logout(&self, account_id: AccountId) -> Result<(), CoreError> {
        let open = self.store.find_open_by_account(account_id).await?;
        let now = self.clock.now();
        for session in open {
            self.store.update_logout(session.key(), now).await?;
        }
        Ok(())
    }

    /// Whether the account currently has at least one open session.
    pub async fn is_online(&self, account_id: AccountId) -> Result<bool, CoreError> {
        Ok(!self.store.find_open_by_account(account_id).await?.is_empty())
    }

    /// All currently open sessions across all accounts.
    pub async fn find_online(&self) -> Result<Vec<Session>, CoreError> {
        self.store.find_open().await
    }

    /// Sessions active within the trailing `window`: every open session
    /// plus closed sessions whose logout falls at or after `now - window`.
    /// Ordered by ascending login time.
    pub async fn find_recent_active(&self, window: Duration) -> Result<Vec<Session>, CoreError> {
        let cutoff = self.clock.now() - window;
        let sessions = self.store.find_all().await?;
        Ok(sessions
            .into_iter()
            .filter(|s| s.logout_time.is_none_or(|out| out >= cutoff))
            .collect())
    }

    /// The most recently opened open session of an account, if any.
    ///
    /// This is the sole seam where the "at most one open session per
    /// account" assumption lives; a deployment with a store-enforced
    /// constraint (e.g. a partial unique index on open sessions) only needs
    /// to change this lookup.
    async fn latest_open_session(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Session>, CoreError> {
        let open = self.store.find_open_by_account(account_id).await?;
        if open.len() > 1 {
            warn!(
                account_id,
                open_sessions = open.len(),
                "account has more than one open session"
            );
        }
        Ok(open.into_iter().max_by_key(|s| s.login_time))
    }
}
