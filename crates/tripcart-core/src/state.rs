//! Shared state types observed by clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sync status of the offline queue.
///
/// `Idle -> Syncing -> Idle` on success, `Idle -> Syncing -> Error` when a
/// pass fails as a whole; the delayed retry moves `Error -> Syncing`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Error,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Syncing => "syncing",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}
