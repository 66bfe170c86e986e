use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Item exists")]
    ItemExists(i64),
}

/// In-memory item store keyed by id.
#[derive(Default)]
pub struct ItemStore {
    inner: RwLock<HashMap<i64, Item>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new item; an existing id is never overwritten.
    pub async fn create(&self, item: Item) -> Result<Item, StoreError> {
        let mut items = self.inner.write().await;
        if items.contains_key(&item.id) {
            debug!(id = item.id, "Item already present");
            return Err(StoreError::ItemExists(item.id));
        }
        items.insert(item.id, item.clone());
        debug!(id = item.id, "Item created");
        Ok(item)
    }

    pub async fn get(&self, id: i64) -> Option<Item> {
        self.inner.read().await.get(&id).cloned()
    }
}
