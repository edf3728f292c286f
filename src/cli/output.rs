//! CLI output: error mapping from domain errors to the CLI surface.

use crate::error::HostError;

/// Map an error chain to one line per cause.
pub fn map_error(e: &anyhow::Error) -> String {
    if let Some(HostError::Cancelled) = e.downcast_ref::<HostError>() {
        return "cancelled; the destination may be partially written".to_string();
    }
    format!("{:#}", e)
}
