use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::{ConversionResult, CurrencyCode};

/// Most recent successful conversion. Each record replaces the previous one.
#[derive(Default)]
pub struct ConversionHistory {
    last: RwLock<Option<ConversionResult>>,
}

impl ConversionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, result: ConversionResult) {
        *self.last.write().await = Some(result);
    }

    pub async fn last(&self) -> Option<ConversionResult> {
        self.last.read().await.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
}

/// Saved currency pairs, kept in insertion order.
#[derive(Default)]
pub struct FavoriteStore {
    entries: RwLock<Vec<Favorite>>,
}

impl FavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, favorite: Favorite) -> Favorite {
        self.entries.write().await.push(favorite.clone());
        favorite
    }

    pub async fn list(&self) -> Vec<Favorite> {
        self.entries.read().await.clone()
    }
}
