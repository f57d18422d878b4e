use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use validator::Validate;

use super::extract::JsonBody;
use super::{AppState, SearchParams};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{Motor, MotorInput};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Motor>>> {
    let mut conn = state.pool.acquire().await?;
    Ok(Json(db::motors::list(&mut conn, params.term()).await?))
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Motor>> {
    let mut conn = state.pool.acquire().await?;
    let motor = db::motors::find(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("motor", id))?;
    Ok(Json(motor))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<MotorInput>,
) -> AppResult<(StatusCode, Json<Motor>)> {
    input.validate()?;
    let mut conn = state.pool.acquire().await?;
    let motor = db::motors::insert(&mut conn, &input).await?;
    tracing::info!(
        "Created motor {} ({}, {} winding sections)",
        motor.id,
        motor.name,
        motor.winding_data.0.len()
    );
    Ok((StatusCode::CREATED, Json(motor)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<MotorInput>,
) -> AppResult<Json<Motor>> {
    input.validate()?;
    let mut conn = state.pool.acquire().await?;
    let motor = db::motors::update(&mut conn, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("motor", id))?;
    Ok(Json(motor))
}

pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    let mut conn = state.pool.acquire().await?;
    match db::motors::delete(&mut conn, id).await? {
        0 => Err(AppError::not_found("motor", id)),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}
