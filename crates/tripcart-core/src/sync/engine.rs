//! One reconciliation pass.
//!
//! The remote list is fetched once as the comparison snapshot, then every
//! queued item is resolved against it in order. Per-item write failures are
//! tallied and never abort the batch; the queue is cleared when fewer than
//! half of the items failed.

use std::collections::HashMap;

use chrono::Utc;

use super::resolve::{resolve, Resolution};
use crate::auth::SessionProvider;
use crate::cache::LocalCacheStore;
use crate::db::LocalStorage;
use crate::error::{RemoteError, SyncError};
use crate::models::{ItemId, ShoppingItem, SyncReport};
use crate::remote::RemoteItemStore;

/// Reconcile the local queue held by `cache` against `remote`.
///
/// Fails as a whole only when nobody is signed in or when the snapshot
/// cannot be fetched; in both cases nothing has been written.
pub async fn reconcile<R, S, P>(
    remote: &R,
    cache: &LocalCacheStore<S>,
    session: &P,
) -> Result<SyncReport, SyncError>
where
    R: RemoteItemStore,
    S: LocalStorage,
    P: SessionProvider + ?Sized,
{
    let queue = cache.load().await;
    if queue.is_empty() {
        tracing::debug!("Offline queue is empty; nothing to sync");
        return Ok(SyncReport::empty());
    }

    if session.current_user_id().is_none() {
        tracing::warn!("Skipping sync of {} queued items: not signed in", queue.len());
        return Err(SyncError::NotAuthenticated);
    }

    let snapshot: HashMap<ItemId, ShoppingItem> = remote
        .list()
        .await
        .map_err(SyncError::Snapshot)?
        .into_iter()
        .map(|item| (item.id.clone(), item))
        .collect();

    let mut report = SyncReport::with_batch_size(queue.len());
    for local in &queue {
        let resolution = resolve(local, snapshot.get(&local.id));
        tracing::debug!("Item {}: {:?}", local.id, resolution);

        match resolution {
            Resolution::Create => match remote.create(local).await {
                Ok(_) => report.created += 1,
                Err(error) => record_failure(&mut report, local, &error),
            },
            Resolution::Update => match remote.update(local).await {
                Ok(_) => report.updated += 1,
                Err(error) => record_failure(&mut report, local, &error),
            },
            Resolution::KeepRemote => {
                tracing::info!(
                    "Conflict on item {}: remote copy is newer, local change discarded",
                    local.id
                );
                report.conflicts += 1;
            }
            Resolution::InSync => report.unchanged += 1,
        }
    }

    if report.should_clear_queue() {
        if !report.failed_ids.is_empty() {
            tracing::warn!(
                "Clearing offline queue with {} unsynced items: {:?}",
                report.failed_ids.len(),
                report.failed_ids
            );
        }
        match cache.clear().await {
            Ok(()) => report.queue_cleared = true,
            Err(error) => tracing::warn!("Failed to clear offline queue: {}", error),
        }
        if let Err(error) = cache.record_sync(Utc::now()).await {
            tracing::warn!("Failed to record sync time: {}", error);
        }
    } else {
        tracing::warn!(
            "{} of {} items failed to sync; keeping offline queue",
            report.errors,
            report.batch_size
        );
    }

    tracing::info!(
        "Sync pass done: {} created, {} updated, {} conflicts, {} unchanged, {} errors",
        report.created,
        report.updated,
        report.conflicts,
        report.unchanged,
        report.errors
    );
    Ok(report)
}

fn record_failure(report: &mut SyncReport, item: &ShoppingItem, error: &RemoteError) {
    tracing::warn!("Failed to sync item {}: {}", item.id, error);
    report.errors += 1;
    report.failed_ids.push(item.id.clone());
}
