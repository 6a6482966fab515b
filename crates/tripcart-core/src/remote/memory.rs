//! In-process remote store with a call log and failure injection.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::{sort_newest_first, RemoteItemStore, RemoteResult};
use crate::error::RemoteError;
use crate::models::{ItemId, ShoppingItem};

/// One call received by a `MemoryItemStore`, with the payload as sent
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    List,
    Create(ShoppingItem),
    Update(ShoppingItem),
    Delete(ItemId),
}

impl RemoteCall {
    pub const fn is_write(&self) -> bool {
        !matches!(self, Self::List)
    }
}

/// `RemoteItemStore` kept in memory
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    owner: Option<String>,
    rows: Mutex<Vec<ShoppingItem>>,
    calls: Mutex<Vec<RemoteCall>>,
    unreachable: AtomicBool,
    list_failures: AtomicUsize,
    failing_ids: Mutex<HashSet<ItemId>>,
}

impl MemoryItemStore {
    /// Store whose writes are owned by `user_id`
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            owner: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Insert rows as-is, without stamping or logging
    pub fn seed(&self, items: impl IntoIterator<Item = ShoppingItem>) {
        lock(&self.rows).extend(items);
    }

    /// Current rows, newest first
    pub fn rows(&self) -> Vec<ShoppingItem> {
        let mut rows = lock(&self.rows).clone();
        sort_newest_first(&mut rows);
        rows
    }

    pub fn row(&self, id: &ItemId) -> Option<ShoppingItem> {
        lock(&self.rows).iter().find(|row| &row.id == id).cloned()
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        lock(&self.calls).clone()
    }

    pub fn write_calls(&self) -> Vec<RemoteCall> {
        self.calls().into_iter().filter(RemoteCall::is_write).collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Fail every call with `Unavailable` while set
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Fail the next `times` calls to `list`
    pub fn fail_next_lists(&self, times: usize) {
        self.list_failures.store(times, Ordering::SeqCst);
    }

    /// Fail every write touching `id`
    pub fn fail_writes_for(&self, id: ItemId) {
        lock(&self.failing_ids).insert(id);
    }

    fn record(&self, call: RemoteCall) {
        lock(&self.calls).push(call);
    }

    fn check_reachable(&self) -> RemoteResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(RemoteError::Unavailable("network unreachable".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_writable(&self, id: &ItemId) -> RemoteResult<()> {
        self.check_reachable()?;
        if lock(&self.failing_ids).contains(id) {
            return Err(RemoteError::Api(format!("write rejected for {id} (500)")));
        }
        Ok(())
    }
}

impl RemoteItemStore for MemoryItemStore {
    async fn list(&self) -> RemoteResult<Vec<ShoppingItem>> {
        self.record(RemoteCall::List);
        self.check_reachable()?;
        let remaining = self.list_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.list_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RemoteError::Unavailable("list failed".to_string()));
        }
        Ok(self.rows())
    }

    async fn create(&self, item: &ShoppingItem) -> RemoteResult<ShoppingItem> {
        self.record(RemoteCall::Create(item.clone()));
        self.check_writable(&item.id)?;
        let owner = self.owner.clone().ok_or(RemoteError::NotAuthenticated)?;

        let mut rows = lock(&self.rows);
        if rows.iter().any(|row| row.id == item.id) {
            return Err(RemoteError::Api(format!(
                "duplicate key value violates unique constraint ({}) (409)",
                item.id
            )));
        }
        let mut row = item.clone();
        row.touch(Utc::now());
        row.user_id = Some(owner);
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, item: &ShoppingItem) -> RemoteResult<ShoppingItem> {
        self.record(RemoteCall::Update(item.clone()));
        self.check_writable(&item.id)?;

        let mut rows = lock(&self.rows);
        let existing = rows
            .iter_mut()
            .find(|row| row.id == item.id)
            .ok_or_else(|| RemoteError::NotFound(item.id.to_string()))?;
        let owner = existing.user_id.take();
        *existing = item.clone();
        existing.user_id = item.user_id.clone().or(owner);
        existing.touch(Utc::now());
        Ok(existing.clone())
    }

    async fn delete(&self, id: &ItemId) -> RemoteResult<()> {
        self.record(RemoteCall::Delete(id.clone()));
        self.check_writable(id)?;
        lock(&self.rows).retain(|row| &row.id != id);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewShoppingItem;
    use chrono::{Duration, TimeZone};

    fn item(name: &str, day: u32) -> ShoppingItem {
        NewShoppingItem::new(name, 5.0, "EUR")
            .into_item(Utc.with_ymd_and_hms(2024, 2, day, 8, 0, 0).unwrap())
            .unwrap()
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryItemStore::new("u1");
        store.seed([item("old", 1), item("new", 3), item("mid", 2)]);

        let names = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn create_stamps_time_and_owner() {
        let store = MemoryItemStore::new("u1");
        let draft = item("scarf", 1);
        let before = Utc::now() - Duration::seconds(1);

        let stored = store.create(&draft).await.unwrap();
        assert_eq!(stored.user_id.as_deref(), Some("u1"));
        assert!(stored.updated_at > before);
        assert_eq!(stored.created_at, draft.created_at);
        assert_eq!(store.calls(), vec![RemoteCall::Create(draft)]);
    }

    #[tokio::test]
    async fn create_without_owner_is_rejected() {
        let store = MemoryItemStore::default();
        assert!(matches!(
            store.create(&item("x", 1)).await,
            Err(RemoteError::NotAuthenticated)
        ));
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let store = MemoryItemStore::new("u1");
        assert!(matches!(
            store.update(&item("ghost", 1)).await,
            Err(RemoteError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn injected_failures_hit_only_their_targets() {
        let store = MemoryItemStore::new("u1");
        let bad = item("bad", 1);
        let good = item("good", 2);
        store.fail_writes_for(bad.id.clone());
        store.fail_next_lists(1);

        assert!(store.list().await.is_err());
        assert!(store.list().await.is_ok());
        assert!(store.create(&bad).await.is_err());
        assert!(store.create(&good).await.is_ok());

        store.set_unreachable(true);
        assert!(matches!(
            store.delete(&good.id).await,
            Err(RemoteError::Unavailable(_))
        ));
    }
}
