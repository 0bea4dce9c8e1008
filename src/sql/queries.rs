//! SQL queries for different databases.

/// Insert a session (PostgreSQL).
pub const INSERT_PG: &str = r#"
INSERT INTO login_sessions (account_id, login_time, logout_time)
VALUES ($1, $2, $3)
"#;

/// Insert a session (MySQL/SQLite).
pub const INSERT_MYSQL: &str = r#"
INSERT INTO login_sessions (account_id, login_time, logout_time)
VALUES (?, ?, ?)
"#;

/// Set the logout time of one session (PostgreSQL).
pub const UPDATE_LOGOUT_PG: &str = r#"
UPDATE login_sessions
SET logout_time = $1
WHERE account_id = $2 AND login_time = $3
"#;

/// Set the logout time of one session (MySQL/SQLite).
pub const UPDATE_LOGOUT_MYSQL: &str = r#"
UPDATE login_sessions
SET logout_time = ?
WHERE account_id = ? AND login_time = ?
"#;

/// All sessions of one account (PostgreSQL).
pub const FIND_BY_ACCOUNT_PG: &str = r#"
SELECT account_id, login_time, logout_time
FROM login_sessions
WHERE account_id = $1
ORDER BY login_time
"#;

/// All sessions of one account (MySQL/SQLite).
pub const FIND_BY_ACCOUNT_MYSQL: &str = r#"
SELECT account_id, login_time, logout_time
FROM login_sessions
WHERE account_id = ?
ORDER BY login_time
"#;

/// Open sessions of one account (PostgreSQL).
pub const FIND_OPEN_BY_ACCOUNT_PG: &str = r#"
SELECT account_id, login_time, logout_time
FROM login_sessions
WHERE account_id = $1 AND logout_time IS NULL
ORDER BY login_time
"#;

/// Open sessions of one account (MySQL/SQLite).
pub const FIND_OPEN_BY_ACCOUNT_MYSQL: &str = r#"
SELECT account_id, login_time, logout_time
FROM login_sessions
WHERE account_id = ? AND logout_time IS NULL
ORDER BY login_time
"#;

/// All open sessions (identical placeholders everywhere).
pub const FIND_OPEN: &str = r#"
SELECT account_id, login_time, logout_time
FROM login_sessions
WHERE logout_time IS NULL
ORDER BY login_time
"#;

/// Sessions in a half-open login-time range (PostgreSQL).
pub const FIND_BY_RANGE_PG: &str = r#"
SELECT account_id, login_time, logout_time
FROM login_sessions
WHERE login_time >= $1 AND login_time < $2
ORDER BY login_time
"#;

/// Sessions in a half-open login-time range (MySQL/SQLite).
pub const FIND_BY_RANGE_MYSQL: &str = r#"
SELECT account_id, login_time, logout_time
FROM login_sessions
WHERE login_time >= ? AND login_time < ?
ORDER BY login_time
"#;

/// The entire session log.
pub const FIND_ALL: &str = r#"
SELECT account_id, login_time, logout_time
FROM login_sessions
ORDER BY login_time
"#;
