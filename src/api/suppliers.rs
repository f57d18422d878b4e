use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use validator::Validate;

use super::extract::JsonBody;
use super::{AppState, SearchParams};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{Supplier, SupplierInput};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Supplier>>> {
    let mut conn = state.pool.acquire().await?;
    let suppliers = db::suppliers::list(&mut conn, params.term()).await?;
    Ok(Json(suppliers))
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Supplier>> {
    let mut conn = state.pool.acquire().await?;
    db::suppliers::find(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("supplier", id))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    input.validate()?;
    let mut conn = state.pool.acquire().await?;
    let supplier = db::suppliers::insert(&mut conn, &input).await?;
    tracing::info!("Created supplier {} ({})", supplier.id, supplier.name);
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<SupplierInput>,
) -> AppResult<Json<Supplier>> {
    input.validate()?;
    let mut conn = state.pool.acquire().await?;
    db::suppliers::update(&mut conn, id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("supplier", id))
}

/// Removes the supplier and the goods received from it.
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    let mut tx = state.pool.begin().await?;
    if db::suppliers::delete(&mut tx, id).await? == 0 {
        return Err(AppError::not_found("supplier", id));
    }
    tx.commit().await?;
    tracing::info!("Deleted supplier {}", id);
    Ok(StatusCode::NO_CONTENT)
}
