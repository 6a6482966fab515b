use super::ItemView;
use crate::models::{ItemId, ShoppingItem};

/// A view edit shown before its write completes.
///
/// Each variant keeps what the view held for the affected id before the
/// edit, so a failed write can be undone.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimisticUpdate {
    Insert {
        item: ShoppingItem,
    },
    Replace {
        item: ShoppingItem,
        previous: Option<ShoppingItem>,
    },
    Remove {
        id: ItemId,
        previous: Option<ShoppingItem>,
    },
}

impl OptimisticUpdate {
    pub const fn insert(item: ShoppingItem) -> Self {
        Self::Insert { item }
    }

    pub fn replace(view: &ItemView, item: ShoppingItem) -> Self {
        let previous = view.get(&item.id).cloned();
        Self::Replace { item, previous }
    }

    pub fn remove(view: &ItemView, id: ItemId) -> Self {
        let previous = view.get(&id).cloned();
        Self::Remove { id, previous }
    }

    pub fn apply(&self, view: &mut ItemView) {
        match self {
            Self::Insert { item } | Self::Replace { item, .. } => {
                view.upsert(item.clone());
            }
            Self::Remove { id, .. } => {
                view.remove(id);
            }
        }
    }

    /// Put the affected entry back the way it was before `apply`.
    pub fn rollback(&self, view: &mut ItemView) {
        match self {
            Self::Insert { item } => {
                view.remove(&item.id);
            }
            Self::Replace { item, previous } => match previous {
                Some(previous) => {
                    view.upsert(previous.clone());
                }
                None => {
                    view.remove(&item.id);
                }
            },
            Self::Remove { previous, .. } => {
                if let Some(previous) = previous {
                    view.upsert(previous.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemPatch, NewShoppingItem};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn item(name: &str, day: u32) -> ShoppingItem {
        NewShoppingItem::new(name, 8.0, "CHF")
            .into_item(Utc.with_ymd_and_hms(2024, 9, day, 0, 0, 0).unwrap())
            .unwrap()
    }

    #[test]
    fn insert_rolls_back_to_absent() {
        let mut view = ItemView::new(vec![item("a", 1)]);
        let before = view.clone();

        let update = OptimisticUpdate::insert(item("b", 2));
        update.apply(&mut view);
        assert_eq!(view.len(), 2);

        update.rollback(&mut view);
        assert_eq!(view, before);
    }

    #[test]
    fn replace_restores_previous_fields() {
        let original = item("a", 1);
        let mut view = ItemView::new(vec![original.clone()]);

        let mut liked = original.clone();
        ItemPatch::liked(true).apply(&mut liked, Utc::now()).unwrap();
        let update = OptimisticUpdate::replace(&view, liked);
        update.apply(&mut view);
        assert!(view.get(&original.id).unwrap().liked);

        update.rollback(&mut view);
        assert_eq!(view.get(&original.id), Some(&original));
    }

    #[test]
    fn remove_restores_entry_and_order() {
        let items = vec![item("a", 1), item("b", 2), item("c", 3)];
        let mut view = ItemView::new(items);
        let before = view.clone();
        let middle = before.items()[1].id.clone();

        let update = OptimisticUpdate::remove(&view, middle);
        update.apply(&mut view);
        assert_eq!(view.len(), 2);

        update.rollback(&mut view);
        assert_eq!(view, before);
    }
}
