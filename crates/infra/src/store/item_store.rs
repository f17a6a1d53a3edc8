use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use thiserror::Error;

use shoplist_core::{Entity, ItemId};
use shoplist_items::{CreateItem, Item, UpdateItem};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A writer panicked while holding the collection lock.
    #[error("item store lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(_: PoisonError<T>) -> Self {
        tracing::error!("item store lock poisoned");
        StoreError::Poisoned
    }
}

/// Keyed collection of items.
///
/// Commands handed to `create`/`update` are expected to be validated already;
/// the store only normalises (trims names) and stamps ids and timestamps.
pub trait ItemStore: Send + Sync {
    /// All items in insertion order.
    fn list(&self) -> Result<Vec<Item>, StoreError>;
    fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError>;
    fn create(&self, cmd: CreateItem) -> Result<Item, StoreError>;
    /// Returns `None` if no item has this id; never creates one.
    fn update(&self, id: &ItemId, cmd: UpdateItem) -> Result<Option<Item>, StoreError>;
    /// Returns whether an item was removed.
    fn remove(&self, id: &ItemId) -> Result<bool, StoreError>;
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    fn list(&self) -> Result<Vec<Item>, StoreError> {
        (**self).list()
    }

    fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get(id)
    }

    fn create(&self, cmd: CreateItem) -> Result<Item, StoreError> {
        (**self).create(cmd)
    }

    fn update(&self, id: &ItemId, cmd: UpdateItem) -> Result<Option<Item>, StoreError> {
        (**self).update(id, cmd)
    }

    fn remove(&self, id: &ItemId) -> Result<bool, StoreError> {
        (**self).remove(id)
    }

    fn len(&self) -> Result<usize, StoreError> {
        (**self).len()
    }
}

/// In-memory item store (process lifetime only).
///
/// One `RwLock` guards the whole collection: readers share it, and each
/// write holds it across its find-then-mutate step.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    inner: RwLock<Vec<Item>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }
}

impl ItemStore for InMemoryItemStore {
    fn list(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.inner.read()?.clone())
    }

    fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        let items = self.inner.read()?;
        Ok(items.iter().find(|i| i.has_id(id)).cloned())
    }

    fn create(&self, cmd: CreateItem) -> Result<Item, StoreError> {
        let mut items = self.inner.write()?;

        // UUIDv7 collisions are not expected; re-roll rather than trust it blindly.
        let mut id = ItemId::new();
        while items.iter().any(|i| i.has_id(&id)) {
            id = ItemId::new();
        }

        let item = Item::create(id, cmd, Utc::now());
        items.push(item.clone());
        Ok(item)
    }

    fn update(&self, id: &ItemId, cmd: UpdateItem) -> Result<Option<Item>, StoreError> {
        let mut items = self.inner.write()?;
        let Some(item) = items.iter_mut().find(|i| i.has_id(id)) else {
            return Ok(None);
        };
        item.apply(cmd, Utc::now());
        Ok(Some(item.clone()))
    }

    fn remove(&self, id: &ItemId) -> Result<bool, StoreError> {
        let mut items = self.inner.write()?;
        match items.iter().position(|i| i.has_id(id)) {
            Some(idx) => {
                items.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read()?.len())
    }
}
