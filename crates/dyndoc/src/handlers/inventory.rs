//! Inventory item handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use dyndoc_core::storage::RepositoryError;

use crate::{
    handlers::AppError,
    models::{CreateInventoryItem, CreateInventoryQuery},
    state::AppState,
};

/// Create an inventory item (POST /api/inventory).
///
/// Responds with the document as the store returned it.
pub async fn create_inventory_item(
    State(state): State<AppState>,
    Query(query): Query<CreateInventoryQuery>,
    Json(payload): Json<CreateInventoryItem>,
) -> Result<impl IntoResponse, AppError> {
    let item = payload.into_document();
    let repository = state.repository().await?;

    let stored = if query.untyped {
        repository.put_untyped(&item).await?
    } else {
        repository.put(&item).await?
    };

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Get an inventory item by id (GET /api/inventory/{id}).
pub async fn get_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let repository = state.repository().await?;

    let item = repository
        .get_by_id(&id)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity_type: "Document",
            id,
        })?;

    Ok(Json(item))
}
