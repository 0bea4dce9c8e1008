//! Tests for the SQL session log backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::clock::ManualClock;
use crate::error::CoreError;
use crate::model::{Session, SessionKey};
use crate::store::SessionStore;
use crate::tracker::SessionTracker;

use super::{DatabaseType, SqlSessionStore, SqlStoreConfig};

/// Create the session log schema.
async fn create_schema(store: &SqlSessionStore) {
    let create_table = r#"
        CREATE TABLE IF NOT EXISTS login_sessions (
            account_id  INTEGER NOT NULL,
            login_time  INTEGER NOT NULL,
            logout_time INTEGER,
            PRIMARY KEY (account_id, login_time)
        )
    "#;

    sqlx::query(create_table)
        .execute(store.pool())
        .await
        .expect("Failed to create table");
}

/// Create a test store on in-memory SQLite.
async fn setup_test_db() -> SqlSessionStore {
    let config = SqlStoreConfig::new("sqlite::memory:").max_connections(1);
    let store = SqlSessionStore::connect(config)
        .await
        .expect("Failed to connect");
    create_schema(&store).await;
    store
}

fn t(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, min, 0).unwrap()
}

async fn seed_closed(store: &SqlSessionStore, id: i64, from: DateTime<Utc>, to: DateTime<Utc>) {
    let mut s = Session::new(id, from);
    s.logout_time = Some(to);
    store.insert(s).await.unwrap();
}

#[tokio::test]
async fn test_database_type_detection() {
    assert_eq!(
        DatabaseType::from_url("postgres://localhost/db"),
        Some(DatabaseType::PostgreSQL)
    );
    assert_eq!(
        DatabaseType::from_url("postgresql://localhost/db"),
        Some(DatabaseType::PostgreSQL)
    );
    assert_eq!(
        DatabaseType::from_url("mysql://localhost/db"),
        Some(DatabaseType::MySQL)
    );
    assert_eq!(
        DatabaseType::from_url("mariadb://localhost/db"),
        Some(DatabaseType::MySQL)
    );
    assert_eq!(
        DatabaseType::from_url("sqlite:test.db"),
        Some(DatabaseType::SQLite)
    );
    assert_eq!(
        DatabaseType::from_url("sqlite::memory:"),
        Some(DatabaseType::SQLite)
    );
    assert_eq!(DatabaseType::from_url("invalid://localhost"), None);
}

#[tokio::test]
async fn test_connect_sqlite() {
    let store = setup_test_db().await;
    assert_eq!(store.database_type(), DatabaseType::SQLite);
}

#[tokio::test]
async fn test_insert_and_find_roundtrip() {
    let store = setup_test_db().await;

    let session = Session::new(1, t(9, 0));
    store.insert(session.clone()).await.unwrap();

    let found = store.find_by_account(1).await.unwrap();
    assert_eq!(found, vec![session]);
}

#[tokio::test]
async fn test_insert_duplicate_key_is_conflict() {
    let store = setup_test_db().await;

    let session = Session::new(1, t(9, 0));
    store.insert(session.clone()).await.unwrap();

    let err = store.insert(session).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn test_update_logout() {
    let store = setup_test_db().await;
    store.insert(Session::new(1, t(9, 0))).await.unwrap();

    store
        .update_logout(
            SessionKey {
                account_id: 1,
                login_time: t(9, 0),
            },
            t(10, 30),
        )
        .await
        .unwrap();

    let found = store.find_by_account(1).await.unwrap();
    assert_eq!(found[0].logout_time, Some(t(10, 30)));
    assert!(store.find_open_by_account(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_logout_missing_key_is_not_found() {
    let store = setup_test_db().await;

    let err = store
        .update_logout(
            SessionKey {
                account_id: 1,
                login_time: t(9, 0),
            },
            t(10, 0),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn test_find_open_across_accounts() {
    let store = setup_test_db().await;
    store.insert(Session::new(1, t(9, 0))).await.unwrap();
    store.insert(Session::new(2, t(9, 30))).await.unwrap();
    seed_closed(&store, 3, t(8, 0), t(8, 45)).await;

    let open = store.find_open().await.unwrap();
    let ids: Vec<_> = open.iter().map(|s| s.account_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_range_query_is_half_open_and_ordered() {
    let store = setup_test_db().await;
    store.insert(Session::new(3, t(11, 0))).await.unwrap();
    store.insert(Session::new(1, t(9, 0))).await.unwrap();
    store.insert(Session::new(2, t(10, 0))).await.unwrap();

    let hits = store
        .find_by_login_time_range(t(9, 0), t(11, 0))
        .await
        .unwrap();
    let ids: Vec<_> = hits.iter().map(|s| s.account_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_find_all_ordered_by_login_time() {
    let store = setup_test_db().await;
    store.insert(Session::new(2, t(10, 0))).await.unwrap();
    store.insert(Session::new(1, t(9, 0))).await.unwrap();

    let all = store.find_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].login_time < all[1].login_time);
}

#[tokio::test]
async fn test_tracker_over_sql_store() {
    let store = Arc::new(setup_test_db().await);
    let clock = Arc::new(ManualClock::new(t(9, 0)));
    let tracker = SessionTracker::new(Arc::clone(&store), Arc::clone(&clock));

    let first = tracker.record_login(1).await.unwrap();
    clock.advance(chrono::Duration::minutes(5));
    let second = tracker.record_login(1).await.unwrap();
    assert_eq!(first.login_time, second.login_time);
    assert!(tracker.is_online(1).await.unwrap());

    clock.advance(chrono::Duration::minutes(55));
    let closed = tracker.record_logout(1).await.unwrap();
    assert_eq!(closed.logout_time, Some(t(10, 0)));
    assert!(!tracker.is_online(1).await.unwrap());
}

#[tokio::test]
async fn test_collision_retry_over_sql_store() {
    let store = Arc::new(setup_test_db().await);
    let clock = Arc::new(ManualClock::new(t(9, 0)));

    // A closed session already occupies the key the frozen clock produces.
    seed_closed(&store, 1, t(9, 0), t(9, 30)).await;

    let tracker = SessionTracker::new(Arc::clone(&store), clock);
    let session = tracker.record_login(1).await.unwrap();
    assert_eq!(
        session.login_time,
        t(9, 0) + chrono::Duration::milliseconds(1)
    );
}

#[tokio::test]
async fn test_config_builder() {
    let config = SqlStoreConfig::new("sqlite::memory:")
        .max_connections(20)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(900))
        .idle_timeout(Duration::from_secs(300));

    assert_eq!(config.database_url, "sqlite::memory:");
    assert_eq!(config.max_connections, 20);
    assert_eq!(config.min_connections, 5);
    assert_eq!(config.connect_timeout, Duration::from_secs(60));
    assert_eq!(config.max_lifetime, Duration::from_secs(900));
    assert_eq!(config.idle_timeout, Duration::from_secs(300));
}

#[tokio::test]
async fn test_config_defaults() {
    let config = SqlStoreConfig::default();

    assert_eq!(config.max_connections, 10);
    assert_eq!(config.min_connections, 1);
}

#[tokio::test]
async fn test_invalid_database_url() {
    let config = SqlStoreConfig::new("invalid://localhost/db");
    let result = SqlSessionStore::connect(config).await;

    result.unwrap_err();
}

#[tokio::test]
async fn test_debug_impl_hides_connection_url() {
    let store = setup_test_db().await;
    let debug_str = format!("{:?}", store);

    assert!(!debug_str.contains("memory"));
    assert!(debug_str.contains("SqlSessionStore"));
}
