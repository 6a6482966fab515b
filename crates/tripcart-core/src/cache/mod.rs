//! Local cache of shopping items waiting to be synced.
//!
//! The whole queue lives under a single storage key as a JSON array, next to
//! a second key holding the time of the last successful sync. Reads fail
//! soft: missing or unreadable data is treated as an empty queue.

use chrono::{DateTime, Utc};

use crate::db::LocalStorage;
use crate::error::Result;
use crate::models::{ItemId, ShoppingItem};

/// Storage key of the queued items
pub const OFFLINE_ITEMS_KEY: &str = "offline_shopping_items";

/// Storage key of the last successful sync time (RFC 3339)
pub const LAST_SYNC_KEY: &str = "last_sync_time";

/// Durable queue of items pending sync
pub struct LocalCacheStore<S> {
    storage: S,
}

impl<S: LocalStorage> LocalCacheStore<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the queued items; never fails.
    pub async fn load(&self) -> Vec<ShoppingItem> {
        let raw = match self.storage.get(OFFLINE_ITEMS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                tracing::warn!("Failed to read offline items: {}", error);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!("Ignoring unreadable offline items: {}", error);
                Vec::new()
            }
        }
    }

    /// Replace the whole queue with `items`.
    pub async fn save(&self, items: &[ShoppingItem]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.storage.set(OFFLINE_ITEMS_KEY, &raw).await
    }

    pub async fn find(&self, id: &ItemId) -> Option<ShoppingItem> {
        self.load().await.into_iter().find(|item| &item.id == id)
    }

    /// Replace the item with the same id in place, or append it.
    pub async fn upsert(&self, item: ShoppingItem) -> Result<()> {
        let mut items = self.load().await;
        if let Some(existing) = items.iter_mut().find(|existing| existing.id == item.id) {
            *existing = item;
        } else {
            items.push(item);
        }
        self.save(&items).await
    }

    /// Remove the item with `id`; returns whether anything was removed.
    pub async fn remove(&self, id: &ItemId) -> Result<bool> {
        let mut items = self.load().await;
        let before = items.len();
        items.retain(|item| &item.id != id);
        if items.len() == before {
            return Ok(false);
        }
        self.save(&items).await?;
        Ok(true)
    }

    pub async fn clear(&self) -> Result<()> {
        self.save(&[]).await
    }

    /// Time of the last successful sync, if one was recorded and is readable
    pub async fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.storage.get(LAST_SYNC_KEY).await.ok().flatten()?;
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|at| at.with_timezone(&Utc))
            .ok()
    }

    pub async fn record_sync(&self, at: DateTime<Utc>) -> Result<()> {
        self.storage.set(LAST_SYNC_KEY, &at.to_rfc3339()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{LibSqlLocalStorage, MemoryLocalStorage};
    use crate::models::NewShoppingItem;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn item(name: &str) -> ShoppingItem {
        NewShoppingItem::new(name, 10.0, "EUR")
            .into_item(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
            .unwrap()
    }

    #[tokio::test]
    async fn load_returns_empty_when_nothing_stored() {
        let cache = LocalCacheStore::new(MemoryLocalStorage::new());
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn load_fails_soft_on_garbage() {
        let storage = MemoryLocalStorage::new();
        storage.set(OFFLINE_ITEMS_KEY, "{not json").await.unwrap();
        let cache = LocalCacheStore::new(storage);

        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_replaces_previous_contents() {
        let cache = LocalCacheStore::new(MemoryLocalStorage::new());
        cache.save(&[item("a"), item("b")]).await.unwrap();
        cache.save(&[item("c")]).await.unwrap();

        let names = cache
            .load()
            .await
            .into_iter()
            .map(|item| item.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["c"]);
    }

    #[tokio::test]
    async fn upsert_replaces_in_place_and_keeps_order() {
        let cache = LocalCacheStore::new(MemoryLocalStorage::new());
        let first = item("first");
        let second = item("second");
        cache.save(&[first.clone(), second.clone()]).await.unwrap();

        let mut renamed = first.clone();
        renamed.name = "first (edited)".to_string();
        cache.upsert(renamed).await.unwrap();
        cache.upsert(item("third")).await.unwrap();

        let loaded = cache.load().await;
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].name, "first (edited)");
        assert_eq!(loaded[1].id, second.id);
        assert_eq!(loaded[2].name, "third");
    }

    #[tokio::test]
    async fn remove_reports_whether_item_existed() {
        let cache = LocalCacheStore::new(MemoryLocalStorage::new());
        let kept = item("kept");
        let dropped = item("dropped");
        cache.save(&[kept.clone(), dropped.clone()]).await.unwrap();

        assert!(cache.remove(&dropped.id).await.unwrap());
        assert!(!cache.remove(&dropped.id).await.unwrap());
        assert_eq!(cache.load().await, vec![kept.clone()]);
        assert_eq!(cache.find(&kept.id).await, Some(kept));
    }

    #[tokio::test]
    async fn last_sync_roundtrip_and_garbage() {
        let cache = LocalCacheStore::new(MemoryLocalStorage::new());
        assert_eq!(cache.last_synced_at().await, None);

        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        cache.record_sync(at).await.unwrap();
        assert_eq!(cache.last_synced_at().await, Some(at));

        cache.storage().set(LAST_SYNC_KEY, "yesterday").await.unwrap();
        assert_eq!(cache.last_synced_at().await, None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn queue_persists_in_libsql_storage() {
        let cache = LocalCacheStore::new(LibSqlLocalStorage::open_in_memory().await.unwrap());
        let queued = item("Kilim rug");
        cache.upsert(queued.clone()).await.unwrap();

        assert_eq!(cache.load().await, vec![queued]);
        cache.clear().await.unwrap();
        assert!(cache.load().await.is_empty());
    }
}
