use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;

use super::extract::JsonBody;
use super::{AppState, SearchParams};
use crate::error::AppResult;
use crate::models::{QuotationDetail, QuotationInput, QuotationPatch};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<QuotationDetail>>> {
    Ok(Json(state.quotations.list(params.term()).await?))
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<QuotationDetail>> {
    Ok(Json(state.quotations.get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<QuotationInput>,
) -> AppResult<(StatusCode, Json<QuotationDetail>)> {
    let detail = state.quotations.create(input).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Replaces the header and reconciles the submitted items against the
/// stored ones.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<QuotationInput>,
) -> AppResult<Json<QuotationDetail>> {
    Ok(Json(state.quotations.update(id, input).await?))
}

pub async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<QuotationPatch>,
) -> AppResult<Json<QuotationDetail>> {
    Ok(Json(state.quotations.patch(id, patch).await?))
}

pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.quotations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
