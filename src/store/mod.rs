//! Store abstraction for the session log and its read-only collaborators.
//!
//! This module provides:
//!
//! - [`SessionStore`] — data-access trait for the append-only session log
//!   (implement this for new backends)
//! - [`AccountStore`] / [`PackageStore`] — read-only collaborator traits
//! - [`MemorySessionStore`] / [`MemoryAccountStore`] / [`MemoryPackageStore`]
//!   — in-memory implementations for tests and small deployments
//!
//! A SQL-backed [`SessionStore`] lives in [`crate::sql`].
//!
//! # Adding a new backend
//!
//! ```ignore
//! use telecom_sessions::store::SessionStore;
//!
//! struct MyStore { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl SessionStore for MyStore {
//!     // insert / update_logout / find_* over your storage
//! }
//! ```

mod memory;
mod traits;

pub use memory::{MemoryAccountStore, MemoryPackageStore, MemorySessionStore};
pub use traits::{AccountStore, PackageStore, SessionStore};
