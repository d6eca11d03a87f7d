//! Error handlers
//!
//! Central reporting for errors that are contained rather than propagated.

use crate::error::types::ChatServerError;
use log::{error, warn};

/// Handle a chat server error
pub fn handle_error(err: &ChatServerError) {
    error!("Chat Server Error: {}", err);
}

/// Report an error that only affects one session or one delivery.
///
/// Sink and registry failures are expected under normal churn, so they are
/// logged at warn level; everything else goes through [`handle_error`].
pub fn report_contained(context: &str, err: &ChatServerError) {
    match err {
        ChatServerError::Sink(_) | ChatServerError::Registry(_) => {
            warn!("{}: {}", context, err)
        }
        _ => handle_error(err),
    }
}
