//! Call failure classification.
//!
//! Failed calls and empty results share one recovery path, but they are
//! logged differently: a collaborator reporting "no rows" is an ordinary miss,
//! anything else is worth a warning.

use crate::broker::CallError;

/// Check if a call failure represents a "no rows found" condition.
///
/// Only specific "no rows" patterns match, so legitimate errors such as
/// "table not found" or "action not found" are not mistaken for misses.
pub(crate) fn is_no_rows_error(error: &CallError) -> bool {
    let error_msg = error.message().to_lowercase();
    error_msg.contains("no rows")
        || error_msg.contains("no row")
        || error_msg.contains("row not found")
        || error_msg.contains("entity not found")
        || error_msg.contains("expected one row")
}

/// Log a call failure at the level its classification warrants
pub(crate) fn log_call_failure(correlation_id: &str, target: &str, error: &CallError) {
    if is_no_rows_error(error) {
        log::debug!("[{correlation_id}] {target} found nothing: {error}");
    } else {
        log::warn!("[{correlation_id}] {target} failed: {error}");
    }
}
