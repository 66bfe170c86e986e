//! Explicitly owned in-memory stores shared by the request handlers.

pub mod history;
pub mod items;

pub use history::{ConversionHistory, Favorite, FavoriteStore};
pub use items::{Item, ItemStore, StoreError};
