//! Infrastructure layer: storage adapters behind domain-facing traits.

pub mod store;

pub use store::{InMemoryItemStore, ItemStore, StoreError};
