//! Failure containment for best-effort bookkeeping.
//!
//! Session bookkeeping is often triggered from the tail of an unrelated
//! primary flow (the authentication path records a login after the
//! credential check succeeds). A failure to persist that record must never
//! abort the primary flow, while direct callers of the tracker API still
//! get real errors. [`best_effort`] is the suppression boundary: wrap the
//! bookkeeping call at the call site, not the business logic beneath it.

use std::future::Future;

use tracing::warn;

use crate::error::CoreError;

/// Run a bookkeeping operation, logging and swallowing its failure.
///
/// Returns `None` when the operation failed.
///
/// # Example
///
/// ```ignore
/// // Inside an authentication flow, after the credential check:
/// audit::best_effort("record login", tracker.record_login(account_id)).await;
/// ```
pub async fn best_effort<T, F>(context: &'static str, op: F) -> Option<T>
where
    F: Future<Output = Result<T, CoreError>>,
{
    match op.await {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(context, %error, "suppressed best-effort bookkeeping failure");
            None
        }
    }
}
