//! HTTP API application wiring (Axum router + store wiring).
//!
//! Layout:
//! - `routes/`: HTTP routes + handlers
//! - `body.rs`: bounded JSON body reading
//! - `dto.rs`: the success envelope
//! - `errors.rs`: the error model and its single translation to HTTP

use std::sync::Arc;

use axum::{Extension, Router};

use shoplist_infra::ItemStore;

use crate::config::ApiConfig;
use crate::middleware;

pub mod body;
pub mod dto;
pub mod errors;
pub mod routes;

/// Store handle shared by every handler.
pub type SharedStore = Arc<dyn ItemStore>;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(config: &ApiConfig, store: SharedStore) -> Router {
    routes::items::router()
        .fallback(routes::items::route_not_found)
        .layer(Extension(store))
        .layer(Extension(config.body_limits()))
        .layer(axum::middleware::from_fn(middleware::log_requests))
}
