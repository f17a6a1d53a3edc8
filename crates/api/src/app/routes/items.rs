use std::convert::Infallible;

use axum::{
    Router,
    async_trait,
    extract::{Extension, FromRequestParts, Path},
    http::{Method, request::Parts},
    routing::{MethodRouter, get},
};

use shoplist_core::ItemId;
use shoplist_items::{validate_create, validate_update};

use crate::app::body::JsonBody;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::{SharedStore, dto};

/// `/items` and `/items/{id}`, each also reachable with one trailing slash.
pub fn router() -> Router {
    let collection: MethodRouter = get(list_items)
        .post(create_item)
        .fallback(method_not_allowed);
    let member: MethodRouter = get(get_item)
        .put(update_item)
        .delete(delete_item)
        .fallback(method_not_allowed);

    Router::new()
        .route("/items", collection.clone())
        .route("/items/", collection)
        .route("/items/:id", member.clone())
        .route("/items/:id/", member)
}

/// The `:id` segment, kept raw so each handler decides when to resolve it.
///
/// Never rejects: a segment axum cannot decode names no item, and that is
/// reported through [`ApiError`] like any other miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPath(Option<String>);

impl ItemPath {
    pub fn resolve(self) -> Result<ItemId, ApiError> {
        let raw = self.0.ok_or_else(ApiError::item_not_found)?;
        Ok(raw.parse()?)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ItemPath
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(raw)) => Ok(Self(Some(raw))),
            Err(rejection) => {
                tracing::debug!(%rejection, "undecodable item id");
                Ok(Self(None))
            }
        }
    }
}

pub async fn list_items(Extension(store): Extension<SharedStore>) -> ApiResult {
    let items = store.list()?;
    Ok(dto::ok(items))
}

pub async fn create_item(
    Extension(store): Extension<SharedStore>,
    JsonBody(body): JsonBody,
) -> ApiResult {
    let cmd = validate_create(body.as_ref()).inspect_err(|e| {
        tracing::debug!(error = %e, details = ?e.details(), "create rejected");
    })?;

    let item = store.create(cmd)?;
    tracing::info!(item_id = %item.id_typed(), name = item.name(), "item created");
    Ok(dto::created(item))
}

pub async fn get_item(
    Extension(store): Extension<SharedStore>,
    id: ItemPath,
) -> ApiResult {
    let id = id.resolve()?;
    store
        .get(&id)?
        .map(dto::ok)
        .ok_or_else(ApiError::item_not_found)
}

pub async fn update_item(
    Extension(store): Extension<SharedStore>,
    id: ItemPath,
    JsonBody(body): JsonBody,
) -> ApiResult {
    // Body problems win over lookup problems: validate before touching the store.
    let cmd = validate_update(body.as_ref()).inspect_err(|e| {
        tracing::debug!(error = %e, details = ?e.details(), "update rejected");
    })?;

    let id = id.resolve()?;
    let item = store.update(&id, cmd)?.ok_or_else(ApiError::item_not_found)?;
    tracing::info!(item_id = %id, "item updated");
    Ok(dto::ok(item))
}

pub async fn delete_item(
    Extension(store): Extension<SharedStore>,
    id: ItemPath,
) -> ApiResult {
    let id = id.resolve()?;
    if !store.remove(&id)? {
        return Err(ApiError::item_not_found());
    }
    tracing::info!(item_id = %id, "item deleted");
    Ok(dto::no_content())
}

pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(&method)
}

/// Fallback for every path no route matched.
pub async fn route_not_found() -> ApiError {
    ApiError::item_not_found()
}
