//! Data-access traits for the session log and its read-only collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::model::{Account, AccountId, Package, Session, SessionKey};

/// Durable, append-only session log keyed by `(account_id, login_time)`.
///
/// Implementations must be thread-safe (`Send + Sync`) as they may be
/// called concurrently from multiple requests. They guarantee per-row
/// atomicity only; no method spans a cross-record transaction, and query
/// methods read without a snapshot across the result set.
///
/// All query methods return sessions ordered by ascending `login_time`
/// so that statistics tie-breaking is deterministic.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session.
    ///
    /// Fails with [`CoreError::Conflict`] when a session with the same
    /// `(account_id, login_time)` key already exists.
    async fn insert(&self, session: Session) -> Result<Session, CoreError>;

    /// Set the logout time of the session identified by `key`.
    ///
    /// Fails with [`CoreError::NotFound`] when no such session exists.
    /// Last write wins when called concurrently for the same key.
    async fn update_logout(
        &self,
        key: SessionKey,
        logout_time: DateTime<Utc>,
    ) -> Result<(), CoreError>;

    /// All sessions of one account.
    async fn find_by_account(&self, account_id: AccountId) -> Result<Vec<Session>, CoreError>;

    /// Open sessions (no logout time) of one account.
    async fn find_open_by_account(&self, account_id: AccountId)
        -> Result<Vec<Session>, CoreError>;

    /// All open sessions across all accounts.
    async fn find_open(&self) -> Result<Vec<Session>, CoreError>;

    /// Sessions with `start <= login_time < end`.
    async fn find_by_login_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, CoreError>;

    /// The entire session log. Used by whole-log aggregations such as the
    /// hourly online distribution.
    async fn find_all(&self) -> Result<Vec<Session>, CoreError>;
}

/// Blanket implementation for `Arc<S>` where `S: SessionStore`.
#[async_trait]
impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    #[inline]
    async fn insert(&self, session: Session) -> Result<Session, CoreError> {
        (**self).insert(session).await
    }

    #[inline]
    async fn update_logout(
        &self,
        key: SessionKey,
        logout_time: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        (**self).update_logout(key, logout_time).await
    }

    #[inline]
    async fn find_by_account(&self, account_id: AccountId) -> Result<Vec<Session>, CoreError> {
        (**self).find_by_account(account_id).await
    }

    #[inline]
    async fn find_open_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Session>, CoreError> {
        (**self).find_open_by_account(account_id).await
    }

    #[inline]
    async fn find_open(&self) -> Result<Vec<Session>, CoreError> {
        (**self).find_open().await
    }

    #[inline]
    async fn find_by_login_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, CoreError> {
        (**self).find_by_login_time_range(start, end).await
    }

    #[inline]
    async fn find_all(&self) -> Result<Vec<Session>, CoreError> {
        (**self).find_all().await
    }
}

/// Read-only view of subscriber accounts. The account service owns the data.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account. Fails with [`CoreError::NotFound`] when absent.
    async fn get(&self, account_id: AccountId) -> Result<Account, CoreError>;
}

#[async_trait]
impl<A: AccountStore + ?Sized> AccountStore for Arc<A> {
    #[inline]
    async fn get(&self, account_id: AccountId) -> Result<Account, CoreError> {
        (**self).get(account_id).await
    }
}

/// Read-only view of purchasable packages.
#[async_trait]
pub trait PackageStore: Send + Sync {
    /// Look up a package. Fails with [`CoreError::NotFound`] when absent.
    async fn get(&self, package_id: i64) -> Result<Package, CoreError>;
}

#[async_trait]
impl<P: PackageStore + ?Sized> PackageStore for Arc<P> {
    #[inline]
    async fn get(&self, package_id: i64) -> Result<Package, CoreError> {
        (**self).get(package_id).await
    }
}
