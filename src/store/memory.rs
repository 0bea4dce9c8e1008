//! In-memory store implementations.
//!
//! Suitable for tests and small single-process deployments. For durable
//! storage use the SQL backend in [`crate::sql`].

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::error::CoreError;
use crate::model::{Account, AccountId, Package, Session, SessionKey};

use super::traits::{AccountStore, PackageStore, SessionStore};

/// In-memory session log.
///
/// Sessions are kept in an ordered map keyed by [`SessionKey`], which gives
/// the ascending-`login_time` ordering the [`SessionStore`] contract asks
/// for and lets per-account queries range-scan instead of filtering the
/// whole log.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    /// Key → logout time (`None` while the session is open).
    sessions: RwLock<BTreeMap<SessionKey, Option<DateTime<Utc>>>>,
}

impl MemorySessionStore {
    /// Create a new empty session log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn account_bounds(account_id: AccountId) -> (SessionKey, SessionKey) {
        (
            SessionKey {
                account_id,
                login_time: DateTime::<Utc>::MIN_UTC,
            },
            SessionKey {
                account_id,
                login_time: DateTime::<Utc>::MAX_UTC,
            },
        )
    }

    fn to_session(key: &SessionKey, logout_time: Option<DateTime<Utc>>) -> Session {
        Session {
            account_id: key.account_id,
            login_time: key.login_time,
            logout_time,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: Session) -> Result<Session, CoreError> {
        let mut sessions = self.sessions.write();
        let key = session.key();
        if sessions.contains_key(&key) {
            return Err(CoreError::Conflict(format!(
                "duplicate session key: account {} at {}",
                key.account_id, key.login_time
            )));
        }
        sessions.insert(key, session.logout_time);
        Ok(session)
    }

    async fn update_logout(
        &self,
        key: SessionKey,
        logout_time: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(&key) {
            Some(slot) => {
                *slot = Some(logout_time);
                Ok(())
            }
            None => Err(CoreError::not_found(format!(
                "session for account {} at {}",
                key.account_id, key.login_time
            ))),
        }
    }

    async fn find_by_account(&self, account_id: AccountId) -> Result<Vec<Session>, CoreError> {
        let (lo, hi) = Self::account_bounds(account_id);
        Ok(self
            .sessions
            .read()
            .range(lo..=hi)
            .map(|(key, logout)| Self::to_session(key, *logout))
            .collect())
    }

    async fn find_open_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Session>, CoreError> {
        let (lo, hi) = Self::account_bounds(account_id);
        Ok(self
            .sessions
            .read()
            .range(lo..=hi)
            .filter(|(_, logout)| logout.is_none())
            .map(|(key, logout)| Self::to_session(key, *logout))
            .collect())
    }

    async fn find_open(&self) -> Result<Vec<Session>, CoreError> {
        let mut open: Vec<Session> = self
            .sessions
            .read()
            .iter()
            .filter(|(_, logout)| logout.is_none())
            .map(|(key, logout)| Self::to_session(key, *logout))
            .collect();
        open.sort_by_key(|s| s.login_time);
        Ok(open)
    }

    async fn find_by_login_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, CoreError> {
        let mut hits: Vec<Session> = self
            .sessions
            .read()
            .iter()
            .filter(|(key, _)| key.login_time >= start && key.login_time < end)
            .map(|(key, logout)| Self::to_session(key, *logout))
            .collect();
        hits.sort_by_key(|s| s.login_time);
        Ok(hits)
    }

    async fn find_all(&self) -> Result<Vec<Session>, CoreError> {
        let mut all: Vec<Session> = self
            .sessions
            .read()
            .iter()
            .map(|(key, logout)| Self::to_session(key, *logout))
            .collect();
        all.sort_by_key(|s| s.login_time);
        Ok(all)
    }
}

/// In-memory account directory for wiring and tests.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl MemoryAccountStore {
    /// Create a new empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account.
    pub fn upsert(&self, account: Account) {
        self.accounts.write().insert(account.account_id, account);
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get(&self, account_id: AccountId) -> Result<Account, CoreError> {
        self.accounts
            .read()
            .get(&account_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(format!("account {account_id}")))
    }
}

/// In-memory package catalog for wiring and tests.
#[derive(Debug, Default)]
pub struct MemoryPackageStore {
    packages: RwLock<HashMap<i64, Package>>,
}

impl MemoryPackageStore {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a package.
    pub fn upsert(&self, package: Package) {
        self.packages.write().insert(package.package_id, package);
    }
}

#[async_trait]
impl PackageStore for MemoryPackageStore {
    async fn get(&self, package_id: i64) -> Result<Package, CoreError> {
        self.packages
            .read()
            .get(&package_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(format!("package {package_id}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn t(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, min, 0).unwrap()
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_key() {
        let store = MemorySessionStore::new();
        let session = Session::new(1, t(9, 0));

        store.insert(session.clone()).await.unwrap();
        let err = store.insert(session).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_logout_missing_key_is_not_found() {
        let store = MemorySessionStore::new();
        let key = SessionKey {
            account_id: 1,
            login_time: t(9, 0),
        };

        let err = store.update_logout(key, t(10, 0)).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn per_account_queries_are_scoped_and_ordered() {
        let store = MemorySessionStore::new();
        store.insert(Session::new(2, t(8, 0))).await.unwrap();
        store.insert(Session::new(1, t(10, 0))).await.unwrap();
        store.insert(Session::new(1, t(9, 0))).await.unwrap();
        store
            .update_logout(
                SessionKey {
                    account_id: 1,
                    login_time: t(9, 0),
                },
                t(9, 30),
            )
            .await
            .unwrap();

        let all = store.find_by_account(1).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].login_time < all[1].login_time);

        let open = store.find_open_by_account(1).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].login_time, t(10, 0));

        let open_all = store.find_open().await.unwrap();
        assert_eq!(open_all.len(), 2);
    }

    #[tokio::test]
    async fn login_time_range_is_half_open() {
        let store = MemorySessionStore::new();
        store.insert(Session::new(1, t(9, 0))).await.unwrap();
        store.insert(Session::new(2, t(10, 0))).await.unwrap();
        store.insert(Session::new(3, t(11, 0))).await.unwrap();

        let hits = store
            .find_by_login_time_range(t(9, 0), t(11, 0))
            .await
            .unwrap();
        let ids: Vec<_> = hits.iter().map(|s| s.account_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn memory_account_and_package_stores() {
        let accounts = MemoryAccountStore::new();
        let packages = MemoryPackageStore::new();

        assert!(matches!(
            accounts.get(7).await.unwrap_err(),
            CoreError::NotFound(_)
        ));
        assert!(matches!(
            packages.get(7).await.unwrap_err(),
            CoreError::NotFound(_)
        ));

        accounts.upsert(Account {
            account_id: 7,
            balance: 12.5,
            package_id: 3,
            package_start_time: t(0, 0) - Duration::days(10),
        });
        packages.upsert(Package {
            package_id: 3,
            duration: "100 hours".to_string(),
            cost: 50.0,
        });

        assert_eq!(accounts.get(7).await.unwrap().package_id, 3);
        assert_eq!(packages.get(3).await.unwrap().duration, "100 hours");
    }
}
