//! The one object front ends hold: online flag, displayed items, sync status
//! and the two stores.
//!
//! Every user mutation goes through here so the view can be updated
//! optimistically and the write routed to the remote store or the offline
//! queue depending on connectivity.

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};

use crate::auth::SessionProvider;
use crate::cache::LocalCacheStore;
use crate::config::SyncSettings;
use crate::connectivity::{ConnectivityMonitor, Transition};
use crate::db::LocalStorage;
use crate::error::{Error, RemoteError, Result, SyncError};
use crate::models::{ItemId, ItemPatch, NewShoppingItem, ShoppingItem, SyncReport};
use crate::remote::RemoteItemStore;
use crate::state::SyncStatus;
use crate::sync::reconcile;
use crate::view::{merge_for_display, ItemView, OptimisticUpdate};

#[derive(Default)]
struct DisplayState {
    view: ItemView,
    /// Last list received from the remote store
    snapshot: Vec<ShoppingItem>,
}

impl DisplayState {
    fn remember_remote(&mut self, item: &ShoppingItem) {
        match self.snapshot.iter_mut().find(|known| known.id == item.id) {
            Some(known) => *known = item.clone(),
            None => self.snapshot.push(item.clone()),
        }
    }

    fn forget_remote(&mut self, id: &ItemId) {
        self.snapshot.retain(|known| &known.id != id);
    }

    fn knows_remote(&self, id: &ItemId) -> bool {
        self.snapshot.iter().any(|known| &known.id == id)
    }
}

/// Offline-first access to the user's shopping items
pub struct SyncContext<R, S> {
    remote: R,
    cache: LocalCacheStore<S>,
    session: Box<dyn SessionProvider + Send + Sync>,
    connectivity: ConnectivityMonitor,
    display: Mutex<DisplayState>,
    status: watch::Sender<SyncStatus>,
    settings: SyncSettings,
}

impl<R: RemoteItemStore, S: LocalStorage> SyncContext<R, S> {
    /// Build the context with the connectivity reading taken at startup.
    pub fn new(
        remote: R,
        storage: S,
        session: impl SessionProvider + Send + Sync + 'static,
        online: bool,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            remote,
            cache: LocalCacheStore::new(storage),
            session: Box::new(session),
            connectivity: ConnectivityMonitor::new(online),
            display: Mutex::new(DisplayState::default()),
            status,
            settings: SyncSettings::default(),
        }
    }

    #[must_use]
    pub const fn with_settings(mut self, settings: SyncSettings) -> Self {
        self.settings = settings;
        self
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    pub const fn cache(&self) -> &LocalCacheStore<S> {
        &self.cache
    }

    pub const fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Items waiting in the offline queue
    pub async fn pending(&self) -> Vec<ShoppingItem> {
        self.cache.load().await
    }

    pub async fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.cache.last_synced_at().await
    }

    /// Current contents of the view
    pub async fn items(&self) -> Vec<ShoppingItem> {
        self.display.lock().await.view.items().to_vec()
    }

    /// Reload the view.
    ///
    /// Online it shows the remote list as-is. Offline, or when the remote
    /// list cannot be fetched, it shows the last remote snapshot merged with
    /// the offline queue.
    pub async fn refresh(&self) -> Vec<ShoppingItem> {
        let fetched = if self.is_online() {
            match self.remote.list().await {
                Ok(items) => Some(items),
                Err(error) => {
                    tracing::warn!(
                        "Failed to load remote items, showing cached view: {}",
                        error
                    );
                    None
                }
            }
        } else {
            None
        };

        let queued = if fetched.is_none() {
            self.cache.load().await
        } else {
            Vec::new()
        };

        let mut display = self.display.lock().await;
        let items = match fetched {
            Some(items) => {
                display.snapshot.clone_from(&items);
                items
            }
            None => merge_for_display(&display.snapshot, &queued),
        };
        display.view.replace_all(items);
        display.view.items().to_vec()
    }

    /// Add a new item and return it as stored.
    pub async fn add_item(&self, draft: NewShoppingItem) -> Result<ShoppingItem> {
        let item = draft.into_item(Utc::now())?;
        let update = OptimisticUpdate::insert(item.clone());
        self.apply(&update).await;

        if self.is_online() {
            match self.remote.create(&item).await {
                Ok(stored) => {
                    self.settle(&stored).await;
                    return Ok(stored);
                }
                Err(error) => {
                    tracing::warn!(
                        "Failed to create item {} remotely, queueing: {}",
                        item.id,
                        error
                    );
                }
            }
        }

        self.queue(item, &update).await
    }

    /// Apply `patch` to the item with `id` and return the new version.
    ///
    /// Items that so far exist only in the offline queue are edited there,
    /// even when online.
    pub async fn update_item(&self, id: &ItemId, patch: &ItemPatch) -> Result<ShoppingItem> {
        let queued = self.cache.find(id).await;
        let is_queued = queued.is_some();
        let current = match queued {
            Some(item) => item,
            None => self
                .display
                .lock()
                .await
                .view
                .get(id)
                .cloned()
                .ok_or_else(|| Error::NotFound(id.to_string()))?,
        };

        let mut next = current;
        patch.apply(&mut next, Utc::now())?;
        let update = {
            let mut display = self.display.lock().await;
            let update = OptimisticUpdate::replace(&display.view, next.clone());
            update.apply(&mut display.view);
            update
        };

        if self.is_online() && !is_queued {
            match self.remote.update(&next).await {
                Ok(stored) => {
                    self.settle(&stored).await;
                    return Ok(stored);
                }
                Err(error) => {
                    tracing::warn!("Failed to update item {} remotely, queueing: {}", id, error);
                }
            }
        }

        self.queue(next, &update).await
    }

    /// Delete the item with `id` from wherever it lives.
    ///
    /// Deleting a remote item needs connectivity: the offline queue holds
    /// items, not deletions.
    pub async fn delete_item(&self, id: &ItemId) -> Result<()> {
        let queued = self.cache.find(id).await;
        let is_queued = queued.is_some();
        let (update, remote_held) = {
            let mut display = self.display.lock().await;
            let in_view = display.view.get(id).is_some();
            if !is_queued && !in_view {
                return Err(Error::NotFound(id.to_string()));
            }
            let remote_held = !is_queued || display.knows_remote(id);
            let update = OptimisticUpdate::remove(&display.view, id.clone());
            update.apply(&mut display.view);
            (update, remote_held)
        };

        let result = self.delete_from_stores(id, queued, remote_held).await;
        if let Err(error) = &result {
            tracing::warn!("Failed to delete item {}: {}", id, error);
            self.rollback(&update).await;
        }
        result
    }

    /// The queued copy goes first, so a remote delete is never followed by
    /// a queue entry that would recreate the row on the next sync.
    async fn delete_from_stores(
        &self,
        id: &ItemId,
        queued: Option<ShoppingItem>,
        remote_held: bool,
    ) -> Result<()> {
        if remote_held && !self.is_online() {
            return Err(RemoteError::Unavailable(
                "deleting a synced item needs a connection".to_string(),
            )
            .into());
        }
        if queued.is_some() {
            self.cache.remove(id).await?;
        }
        if !remote_held {
            return Ok(());
        }

        if let Err(error) = self.remote.delete(id).await {
            if let Some(item) = queued {
                if let Err(requeue) = self.cache.upsert(item).await {
                    tracing::warn!("Failed to restore queued item {}: {}", id, requeue);
                }
            }
            return Err(error.into());
        }
        self.display.lock().await.forget_remote(id);
        Ok(())
    }

    /// Feed a connectivity report.
    ///
    /// Coming back online runs one sync pass; repeated reports of the same
    /// status do nothing.
    pub async fn set_online(&self, online: bool) -> Option<Transition> {
        let transition = self.connectivity.update(online)?;
        if transition == Transition::CameOnline {
            self.sync_after_reconnect().await;
        }
        Some(transition)
    }

    /// Follow `online` until its sender is dropped, syncing on every
    /// reconnect.
    ///
    /// Reports keep reaching the connectivity monitor while a sync pass or
    /// its retry delay is running. A reconnect seen during a pass runs one
    /// more pass once the current one is done.
    pub async fn watch_connectivity(&self, mut online: watch::Receiver<bool>) {
        let mut open = true;
        let mut reconnected = self.forward(&mut online);
        loop {
            if reconnected {
                reconnected = self.sync_following(&mut online, &mut open).await;
            } else if !open || online.changed().await.is_err() {
                break;
            } else {
                reconnected = self.forward(&mut online);
            }
        }
    }

    /// Run one reconnect sync while still forwarding `online`.
    ///
    /// Returns whether another reconnect happened meanwhile and the
    /// context is still online.
    async fn sync_following(&self, online: &mut watch::Receiver<bool>, open: &mut bool) -> bool {
        let mut reconnected = false;
        let sync = self.sync_after_reconnect();
        tokio::pin!(sync);
        loop {
            tokio::select! {
                () = &mut sync => break,
                changed = online.changed(), if *open => {
                    if changed.is_err() {
                        *open = false;
                    } else if self.forward(online) {
                        reconnected = true;
                    }
                }
            }
        }
        reconnected && self.is_online()
    }

    /// Pass the latest value of `online` to the monitor; `true` on reconnect.
    fn forward(&self, online: &mut watch::Receiver<bool>) -> bool {
        let current = *online.borrow_and_update();
        self.connectivity.update(current) == Some(Transition::CameOnline)
    }

    async fn sync_after_reconnect(&self) {
        if let Err(error) = self.sync().await {
            tracing::warn!("Sync after reconnect failed: {}", error);
        }
    }

    /// Run one reconciliation pass, retrying once after the configured
    /// delay when the remote snapshot could not be fetched.
    pub async fn sync(&self) -> Result<SyncReport> {
        if self.cache.load().await.is_empty() {
            tracing::debug!("Nothing queued; sync skipped");
            return Ok(SyncReport::empty());
        }

        match self.sync_pass().await {
            Err(error) if error.is_retryable() => {
                tracing::warn!(
                    "Sync failed, retrying in {:?}: {}",
                    self.settings.retry_delay,
                    error
                );
                tokio::time::sleep(self.settings.retry_delay).await;
                if !self.is_online() {
                    tracing::info!("Offline at retry time; leaving items queued");
                    return Err(error.into());
                }
                self.sync_pass().await.map_err(Error::from)
            }
            other => other.map_err(Error::from),
        }
    }

    async fn sync_pass(&self) -> std::result::Result<SyncReport, SyncError> {
        self.set_status(SyncStatus::Syncing);
        let result = reconcile(&self.remote, &self.cache, self.session.as_ref()).await;
        if !matches!(result, Err(SyncError::NotAuthenticated)) {
            self.refresh().await;
        }
        self.set_status(if result.is_ok() {
            SyncStatus::Idle
        } else {
            SyncStatus::Error
        });
        result
    }

    fn set_status(&self, status: SyncStatus) {
        let previous = self.status.send_replace(status);
        if previous != status {
            tracing::debug!("Sync status {} -> {}", previous, status);
        }
    }

    async fn apply(&self, update: &OptimisticUpdate) {
        update.apply(&mut self.display.lock().await.view);
    }

    async fn rollback(&self, update: &OptimisticUpdate) {
        update.rollback(&mut self.display.lock().await.view);
    }

    /// Show the stored version of a successful remote write.
    async fn settle(&self, stored: &ShoppingItem) {
        let mut display = self.display.lock().await;
        display.remember_remote(stored);
        display.view.upsert(stored.clone());
    }

    /// Fall back to the offline queue, undoing the view edit if that fails.
    async fn queue(&self, item: ShoppingItem, update: &OptimisticUpdate) -> Result<ShoppingItem> {
        match self.cache.upsert(item.clone()).await {
            Ok(()) => {
                tracing::debug!("Queued item {} for sync", item.id);
                Ok(item)
            }
            Err(error) => {
                tracing::warn!("Failed to queue item {}: {}", item.id, error);
                self.rollback(update).await;
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::{test_session, SessionHandle};
    use crate::db::MemoryLocalStorage;
    use crate::remote::{MemoryItemStore, RemoteCall};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    type Context = SyncContext<MemoryItemStore, MemoryLocalStorage>;

    fn context(online: bool) -> Context {
        SyncContext::new(
            MemoryItemStore::new("u1"),
            MemoryLocalStorage::new(),
            SessionHandle::signed_in(test_session("u1")),
            online,
        )
        .with_settings(SyncSettings::default().with_retry_delay(Duration::from_secs(5)))
    }

    fn draft(name: &str) -> NewShoppingItem {
        NewShoppingItem::new(name, 100.0, "JPY").with_conversion("EUR", 0.0062)
    }

    fn remote_item(name: &str, day: u32) -> ShoppingItem {
        let mut item = draft(name)
            .into_item(Utc.with_ymd_and_hms(2024, 4, day, 10, 0, 0).unwrap())
            .unwrap();
        item.user_id = Some("u1".to_string());
        item
    }

    fn list_calls(ctx: &Context) -> usize {
        ctx.remote()
            .calls()
            .into_iter()
            .filter(|call| *call == RemoteCall::List)
            .count()
    }

    #[tokio::test]
    async fn online_add_goes_straight_to_remote() {
        let ctx = context(true);

        let stored = ctx.add_item(draft("matcha")).await.unwrap();

        assert_eq!(stored.user_id.as_deref(), Some("u1"));
        assert!(ctx.pending().await.is_empty());
        assert_eq!(ctx.items().await, vec![stored.clone()]);
        assert_eq!(ctx.remote().rows(), vec![stored]);
    }

    #[tokio::test]
    async fn offline_add_is_queued_and_shown() {
        let ctx = context(false);

        let item = ctx.add_item(draft("matcha")).await.unwrap();

        assert_eq!(item.user_id, None);
        assert_eq!(ctx.pending().await, vec![item.clone()]);
        assert_eq!(ctx.items().await, vec![item]);
        assert!(ctx.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn failed_remote_write_falls_back_to_queue() {
        let ctx = context(true);
        ctx.remote().set_unreachable(true);

        let item = ctx.add_item(draft("kimono")).await.unwrap();

        assert_eq!(ctx.pending().await, vec![item.clone()]);
        assert_eq!(ctx.items().await, vec![item]);
    }

    #[tokio::test]
    async fn failed_queue_write_rolls_back_view() {
        let ctx = context(false);
        let kept = ctx.add_item(draft("fan")).await.unwrap();
        ctx.cache().storage().set_fail_writes(true);

        let result = ctx.add_item(draft("kimono")).await;

        assert!(result.is_err());
        assert_eq!(ctx.items().await, vec![kept]);
    }

    #[tokio::test]
    async fn failed_update_rolls_back_view() {
        let ctx = context(true);
        let item = ctx.add_item(draft("fan")).await.unwrap();
        ctx.remote().set_unreachable(true);
        ctx.cache().storage().set_fail_writes(true);

        let result = ctx.update_item(&item.id, &ItemPatch::liked(true)).await;

        assert!(result.is_err());
        assert_eq!(ctx.items().await, vec![item]);
    }

    #[tokio::test]
    async fn queued_items_are_edited_in_queue_while_online() {
        let ctx = context(false);
        let item = ctx.add_item(draft("fan")).await.unwrap();
        ctx.connectivity().update(true);

        let liked = ctx.update_item(&item.id, &ItemPatch::liked(true)).await.unwrap();

        assert!(liked.liked);
        assert!(liked.updated_at >= item.updated_at);
        assert_eq!(ctx.pending().await, vec![liked]);
        assert!(ctx.remote().write_calls().is_empty());
    }

    #[tokio::test]
    async fn offline_edit_of_remote_item_queues_full_copy() {
        let ctx = context(true);
        ctx.remote().seed([remote_item("lantern", 1)]);
        let items = ctx.refresh().await;
        ctx.connectivity().update(false);

        let purchased = ctx
            .update_item(&items[0].id, &ItemPatch::purchased(true))
            .await
            .unwrap();

        assert_eq!(ctx.pending().await, vec![purchased.clone()]);
        assert_eq!(ctx.refresh().await, vec![purchased]);
    }

    #[tokio::test]
    async fn update_of_unknown_item_is_not_found() {
        let ctx = context(true);
        let result = ctx.update_item(&ItemId::new(), &ItemPatch::liked(true)).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_of_queued_item_stays_local() {
        let ctx = context(true);
        ctx.connectivity().update(false);
        let item = ctx.add_item(draft("fan")).await.unwrap();
        ctx.connectivity().update(true);

        ctx.delete_item(&item.id).await.unwrap();

        assert!(ctx.pending().await.is_empty());
        assert!(ctx.items().await.is_empty());
        assert!(ctx.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn offline_delete_of_remote_item_is_refused() {
        let ctx = context(true);
        ctx.remote().seed([remote_item("lantern", 1)]);
        let items = ctx.refresh().await;
        ctx.connectivity().update(false);

        let result = ctx.delete_item(&items[0].id).await;

        assert!(matches!(
            result,
            Err(Error::Remote(RemoteError::Unavailable(_)))
        ));
        assert_eq!(ctx.items().await, items);
    }

    #[tokio::test]
    async fn online_delete_removes_remote_row() {
        let ctx = context(true);
        ctx.remote().seed([remote_item("lantern", 1), remote_item("bowl", 2)]);
        let items = ctx.refresh().await;

        ctx.delete_item(&items[0].id).await.unwrap();

        assert_eq!(ctx.items().await, vec![items[1].clone()]);
        assert_eq!(ctx.remote().rows(), vec![items[1].clone()]);
    }

    #[tokio::test]
    async fn failed_queue_removal_keeps_remote_row() {
        let ctx = context(true);
        ctx.remote().seed([remote_item("lantern", 1)]);
        let items = ctx.refresh().await;
        ctx.connectivity().update(false);
        let purchased = ctx
            .update_item(&items[0].id, &ItemPatch::purchased(true))
            .await
            .unwrap();
        ctx.connectivity().update(true);
        ctx.cache().storage().set_fail_writes(true);

        let result = ctx.delete_item(&purchased.id).await;

        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(ctx.remote().write_calls().is_empty());
        assert_eq!(ctx.remote().rows(), items);
        assert_eq!(ctx.pending().await, vec![purchased.clone()]);
        assert_eq!(ctx.items().await, vec![purchased]);
    }

    #[tokio::test]
    async fn failed_remote_delete_requeues_item() {
        let ctx = context(true);
        ctx.remote().seed([remote_item("lantern", 1)]);
        let items = ctx.refresh().await;
        ctx.connectivity().update(false);
        let purchased = ctx
            .update_item(&items[0].id, &ItemPatch::purchased(true))
            .await
            .unwrap();
        ctx.connectivity().update(true);
        ctx.remote().set_unreachable(true);

        let result = ctx.delete_item(&purchased.id).await;

        assert!(matches!(
            result,
            Err(Error::Remote(RemoteError::Unavailable(_)))
        ));
        assert_eq!(ctx.remote().rows(), items);
        assert_eq!(ctx.pending().await, vec![purchased.clone()]);
        assert_eq!(ctx.items().await, vec![purchased]);
    }

    #[tokio::test]
    async fn online_delete_of_queued_remote_item_clears_both() {
        let ctx = context(true);
        ctx.remote().seed([remote_item("lantern", 1)]);
        let items = ctx.refresh().await;
        ctx.connectivity().update(false);
        ctx.update_item(&items[0].id, &ItemPatch::liked(true))
            .await
            .unwrap();
        ctx.connectivity().update(true);

        ctx.delete_item(&items[0].id).await.unwrap();

        assert!(ctx.pending().await.is_empty());
        assert!(ctx.remote().rows().is_empty());
        assert!(ctx.refresh().await.is_empty());
    }

    #[tokio::test]
    async fn offline_view_merges_snapshot_and_queue() {
        let ctx = context(true);
        let v1 = remote_item("hat", 1);
        ctx.remote().seed([v1.clone(), remote_item("bag", 2)]);
        ctx.refresh().await;

        let mut v2 = v1.clone();
        v2.name = "red hat".to_string();
        v2.updated_at = v1.updated_at + chrono::Duration::hours(1);
        ctx.cache().save(&[v2.clone()]).await.unwrap();
        ctx.connectivity().update(false);

        let names: Vec<String> = ctx.refresh().await.into_iter().map(|item| item.name).collect();
        assert_eq!(names, vec!["bag", "red hat"]);
    }

    #[tokio::test]
    async fn reconnect_syncs_queue_once() {
        let ctx = context(false);
        let item = ctx.add_item(draft("fan")).await.unwrap();

        assert_eq!(ctx.set_online(true).await, Some(Transition::CameOnline));
        assert_eq!(ctx.set_online(true).await, None);

        assert_eq!(ctx.remote().write_calls(), vec![RemoteCall::Create(item.clone())]);
        assert!(ctx.pending().await.is_empty());
        assert_eq!(ctx.status(), SyncStatus::Idle);
        assert!(ctx.last_synced_at().await.is_some());
        assert_eq!(ctx.items().await.len(), 1);
        assert_eq!(ctx.items().await[0].id, item.id);
    }

    #[tokio::test]
    async fn going_offline_has_no_side_effects() {
        let ctx = context(true);
        assert_eq!(ctx.set_online(false).await, Some(Transition::WentOffline));
        assert!(ctx.remote().calls().is_empty());
        assert_eq!(ctx.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn empty_queue_sync_is_a_no_op() {
        let ctx = context(true);
        let mut status = ctx.subscribe_status();

        let report = ctx.sync().await.unwrap();

        assert_eq!(report, SyncReport::empty());
        assert!(ctx.remote().calls().is_empty());
        assert_eq!(ctx.status(), SyncStatus::Idle);
        assert!(!status.has_changed().unwrap());
    }

    #[tokio::test]
    async fn missing_session_is_not_retried() {
        let ctx = SyncContext::new(
            MemoryItemStore::new("u1"),
            MemoryLocalStorage::new(),
            SessionHandle::default(),
            false,
        );
        ctx.add_item(draft("fan")).await.unwrap();
        ctx.connectivity().update(true);

        let result = ctx.sync().await;

        assert!(matches!(result, Err(Error::Sync(SyncError::NotAuthenticated))));
        assert_eq!(ctx.status(), SyncStatus::Error);
        assert!(ctx.remote().calls().is_empty());
        assert_eq!(ctx.pending().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_snapshot_is_retried_once_after_delay() {
        let ctx = context(false);
        ctx.add_item(draft("fan")).await.unwrap();
        ctx.connectivity().update(true);
        // pass list, its refresh, then the retry succeeds
        ctx.remote().fail_next_lists(2);

        let started = tokio::time::Instant::now();
        let report = ctx.sync().await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(report.created, 1);
        assert_eq!(list_calls(&ctx), 4);
        assert_eq!(ctx.status(), SyncStatus::Idle);
        assert!(ctx.pending().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn retry_gives_up_after_second_failure() {
        let ctx = context(false);
        ctx.add_item(draft("fan")).await.unwrap();
        ctx.connectivity().update(true);
        ctx.remote().fail_next_lists(10);

        let result = ctx.sync().await;

        assert!(matches!(result, Err(Error::Sync(SyncError::Snapshot(_)))));
        // two passes, each followed by a refresh
        assert_eq!(list_calls(&ctx), 4);
        assert_eq!(ctx.status(), SyncStatus::Error);
        assert_eq!(ctx.pending().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn no_retry_when_offline_at_retry_time() {
        let ctx = context(false);
        ctx.add_item(draft("fan")).await.unwrap();
        ctx.connectivity().update(true);
        ctx.remote().fail_next_lists(2);

        let (result, _) = tokio::join!(ctx.sync(), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            ctx.set_online(false).await
        });

        assert!(result.is_err());
        assert_eq!(list_calls(&ctx), 2);
        assert_eq!(ctx.status(), SyncStatus::Error);
        assert_eq!(ctx.pending().await.len(), 1);
    }

    #[tokio::test]
    async fn watch_connectivity_follows_the_channel() {
        let ctx = context(false);
        let item = ctx.add_item(draft("fan")).await.unwrap();
        let (sender, receiver) = watch::channel(false);

        let feed = async move {
            tokio::task::yield_now().await;
            sender.send_replace(true);
            tokio::task::yield_now().await;
            sender.send_replace(true);
            drop(sender);
        };
        tokio::join!(ctx.watch_connectivity(receiver), feed);

        assert!(ctx.is_online());
        assert_eq!(ctx.remote().write_calls(), vec![RemoteCall::Create(item)]);
    }

    #[tokio::test(start_paused = true)]
    async fn watched_offline_report_during_retry_delay_cancels_retry() {
        let ctx = context(false);
        ctx.add_item(draft("fan")).await.unwrap();
        ctx.remote().fail_next_lists(2);
        let (sender, receiver) = watch::channel(false);

        let feed = async move {
            tokio::task::yield_now().await;
            sender.send_replace(true);
            tokio::time::sleep(Duration::from_secs(1)).await;
            sender.send_replace(false);
            tokio::time::sleep(Duration::from_secs(10)).await;
        };
        tokio::join!(ctx.watch_connectivity(receiver), feed);

        assert!(!ctx.is_online());
        // first pass and its refresh only
        assert_eq!(list_calls(&ctx), 2);
        assert!(ctx.remote().write_calls().is_empty());
        assert_eq!(ctx.status(), SyncStatus::Error);
        assert_eq!(ctx.pending().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn watched_reconnect_during_retry_delay_syncs_again() {
        let ctx = context(false);
        let item = ctx.add_item(draft("fan")).await.unwrap();
        // both passes of the first sync fail, the next sync succeeds
        ctx.remote().fail_next_lists(4);
        let (sender, receiver) = watch::channel(false);

        let feed = async move {
            tokio::task::yield_now().await;
            sender.send_replace(true);
            tokio::time::sleep(Duration::from_secs(1)).await;
            sender.send_replace(false);
            tokio::time::sleep(Duration::from_secs(1)).await;
            sender.send_replace(true);
            tokio::time::sleep(Duration::from_secs(20)).await;
        };
        tokio::join!(ctx.watch_connectivity(receiver), feed);

        assert!(ctx.is_online());
        assert_eq!(list_calls(&ctx), 6);
        assert_eq!(ctx.remote().write_calls(), vec![RemoteCall::Create(item)]);
        assert_eq!(ctx.status(), SyncStatus::Idle);
        assert!(ctx.pending().await.is_empty());
    }
}
