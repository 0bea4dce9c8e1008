//! SQL session log backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};

use crate::error::CoreError;
use crate::model::{AccountId, Session, SessionKey};
use crate::store::SessionStore;

use super::config::SqlStoreConfig;
use super::queries;

/// Database type enum for query selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// PostgreSQL database.
    PostgreSQL,
    /// MySQL/MariaDB database.
    MySQL,
    /// SQLite database.
    SQLite,
}

impl DatabaseType {
    /// Detect database type from URL.
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(Self::PostgreSQL)
        } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Some(Self::MySQL)
        } else if url.starts_with("sqlite:") {
            Some(Self::SQLite)
        } else {
            None
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CoreError::Conflict(format!("duplicate session key: {db}"))
            }
            sqlx::Error::RowNotFound => CoreError::not_found("session row"),
            _ => CoreError::backend(err),
        }
    }
}

/// SQL-backed session log.
///
/// Supports PostgreSQL, MySQL, and SQLite through the SQLx Any pool. See
/// the [module docs](super) for the expected schema.
pub struct SqlSessionStore {
    pool: AnyPool,
    db_type: DatabaseType,
    config: SqlStoreConfig,
}

impl SqlSessionStore {
    /// Connect to the database and create the store.
    pub async fn connect(config: SqlStoreConfig) -> Result<Self, CoreError> {
        // Install database drivers for the "any" pool
        sqlx::any::install_default_drivers();

        let db_type = DatabaseType::from_url(&config.database_url)
            .ok_or_else(|| CoreError::backend("unsupported database URL scheme"))?;

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .max_lifetime(config.max_lifetime)
            .idle_timeout(config.idle_timeout)
            .connect(&config.database_url)
            .await?;

        Ok(Self {
            pool,
            db_type,
            config,
        })
    }

    /// Get the connection pool (for schema setup or advanced usage).
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Get database type.
    pub fn database_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Pick the query variant for the connected database.
    #[inline]
    fn query_for(&self, pg: &'static str, other: &'static str) -> &'static str {
        match self.db_type {
            DatabaseType::PostgreSQL => pg,
            DatabaseType::MySQL | DatabaseType::SQLite => other,
        }
    }

    /// Decode a unix-microseconds column into a timestamp.
    fn timestamp_from_micros(micros: i64) -> Result<DateTime<Utc>, CoreError> {
        DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| CoreError::backend(format!("timestamp out of range: {micros}")))
    }

    /// Parse a session row.
    fn parse_session_row(row: AnyRow) -> Result<Session, CoreError> {
        let account_id: i64 = row.try_get("account_id")?;
        let login_micros: i64 = row.try_get("login_time")?;
        let logout_micros: Option<i64> = row.try_get("logout_time")?;

        Ok(Session {
            account_id,
            login_time: Self::timestamp_from_micros(login_micros)?,
            logout_time: logout_micros
                .map(Self::timestamp_from_micros)
                .transpose()?,
        })
    }

    async fn fetch_sessions(
        &self,
        query: &'static str,
        account_id: Option<AccountId>,
    ) -> Result<Vec<Session>, CoreError> {
        let mut q = sqlx::query(query);
        if let Some(account_id) = account_id {
            q = q.bind(account_id);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::parse_session_row).collect()
    }
}

#[async_trait]
impl SessionStore for SqlSessionStore {
    async fn insert(&self, session: Session) -> Result<Session, CoreError> {
        let query = self.query_for(queries::INSERT_PG, queries::INSERT_MYSQL);

        sqlx::query(query)
            .bind(session.account_id)
            .bind(session.login_time.timestamp_micros())
            .bind(session.logout_time.map(|t| t.timestamp_micros()))
            .execute(&self.pool)
            .await?;

        Ok(session)
    }

    async fn update_logout(
        &self,
        key: SessionKey,
        logout_time: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let query = self.query_for(queries::UPDATE_LOGOUT_PG, queries::UPDATE_LOGOUT_MYSQL);

        let result = sqlx::query(query)
            .bind(logout_time.timestamp_micros())
            .bind(key.account_id)
            .bind(key.login_time.timestamp_micros())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(format!(
                "session for account {} at {}",
                key.account_id, key.login_time
            )));
        }
        Ok(())
    }

    async fn find_by_account(&self, account_id: AccountId) -> Result<Vec<Session>, CoreError> {
        let query = self.query_for(queries::FIND_BY_ACCOUNT_PG, queries::FIND_BY_ACCOUNT_MYSQL);
        self.fetch_sessions(query, Some(account_id)).await
    }

    async fn find_open_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Session>, CoreError> {
        let query = self.query_for(
            queries::FIND_OPEN_BY_ACCOUNT_PG,
            queries::FIND_OPEN_BY_ACCOUNT_MYSQL,
        );
        self.fetch_sessions(query, Some(account_id)).await
    }

    async fn find_open(&self) -> Result<Vec<Session>, CoreError> {
        self.fetch_sessions(queries::FIND_OPEN, None).await
    }

    async fn find_by_login_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, CoreError> {
        let query = self.query_for(queries::FIND_BY_RANGE_PG, queries::FIND_BY_RANGE_MYSQL);

        let rows = sqlx::query(query)
            .bind(start.timestamp_micros())
            .bind(end.timestamp_micros())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::parse_session_row).collect()
    }

    async fn find_all(&self) -> Result<Vec<Session>, CoreError> {
        self.fetch_sessions(queries::FIND_ALL, None).await
    }
}

// Debug implementation (don't leak connection credentials)
impl std::fmt::Debug for SqlSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlSessionStore")
            .field("db_type", &self.db_type)
            .field("max_connections", &self.config.max_connections)
            .finish_non_exhaustive()
    }
}
