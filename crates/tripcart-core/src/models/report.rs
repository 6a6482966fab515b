//! Reconciliation pass tally

use serde::{Deserialize, Serialize};

use super::ItemId;

/// Outcome of one reconciliation pass over the local queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Number of queued items the pass looked at
    pub batch_size: usize,
    /// Queued items with no remote counterpart, created remotely
    pub created: usize,
    /// Remote rows overwritten by a newer local copy
    pub updated: usize,
    /// Local changes discarded because the remote row was newer
    pub conflicts: usize,
    /// Items whose timestamps already matched
    pub unchanged: usize,
    /// Items whose remote write failed
    pub errors: usize,
    /// Ids of the items counted in `errors`
    pub failed_ids: Vec<ItemId>,
    /// Whether the local queue was cleared after the pass
    pub queue_cleared: bool,
}

impl SyncReport {
    /// Report for a pass over an empty queue.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Self::default()
        }
    }

    /// The queue is cleared when fewer than half of the items errored.
    #[must_use]
    pub const fn should_clear_queue(&self) -> bool {
        self.errors * 2 < self.batch_size
    }

    pub const fn is_empty(&self) -> bool {
        self.batch_size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(batch_size: usize, errors: usize) -> SyncReport {
        SyncReport {
            batch_size,
            errors,
            ..SyncReport::default()
        }
    }

    #[test]
    fn clearing_threshold_is_strictly_below_half() {
        assert!(report(1, 0).should_clear_queue());
        assert!(!report(1, 1).should_clear_queue());
        assert!(report(4, 1).should_clear_queue());
        assert!(!report(4, 2).should_clear_queue());
        assert!(report(5, 2).should_clear_queue());
        assert!(!report(5, 3).should_clear_queue());
    }

    #[test]
    fn empty_report_has_no_batch() {
        let empty = SyncReport::empty();
        assert!(empty.is_empty());
        assert!(!empty.queue_cleared);
    }
}
