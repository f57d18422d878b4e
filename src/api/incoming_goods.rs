use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use validator::Validate;

use super::extract::JsonBody;
use super::{AppState, SearchParams};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{IncomingGood, IncomingGoodInput};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<IncomingGood>>> {
    let mut conn = state.pool.acquire().await?;
    Ok(Json(db::incoming_goods::list(&mut conn, params.term()).await?))
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<IncomingGood>> {
    let mut conn = state.pool.acquire().await?;
    let good = db::incoming_goods::find(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("incoming good", id))?;
    Ok(Json(good))
}

/// Records a delivery. An unknown supplier fails the foreign key and comes
/// back as a validation error.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<IncomingGoodInput>,
) -> AppResult<(StatusCode, Json<IncomingGood>)> {
    input.validate()?;
    let mut tx = state.pool.begin().await?;
    let id = db::incoming_goods::insert(&mut tx, &input).await?;
    let good = db::incoming_goods::find(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("incoming good", id))?;
    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(good)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<IncomingGoodInput>,
) -> AppResult<Json<IncomingGood>> {
    input.validate()?;
    let mut tx = state.pool.begin().await?;
    if db::incoming_goods::update(&mut tx, id, &input).await? == 0 {
        return Err(AppError::not_found("incoming good", id));
    }
    let good = db::incoming_goods::find(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("incoming good", id))?;
    tx.commit().await?;
    Ok(Json(good))
}

pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    let mut conn = state.pool.acquire().await?;
    if db::incoming_goods::delete(&mut conn, id).await? == 0 {
        return Err(AppError::not_found("incoming good", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
