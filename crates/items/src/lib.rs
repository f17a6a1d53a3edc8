//! Shopping-list items domain module.
//!
//! This crate contains the Item entity, the typed commands that mutate it, and
//! the validators that turn untyped request JSON into those commands. No IO, no
//! HTTP, no storage.

pub mod item;
pub mod validate;

pub use item::{CreateItem, Item, UpdateItem};
pub use validate::{FieldError, ValidationError, validate_create, validate_update};
