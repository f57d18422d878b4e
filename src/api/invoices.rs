use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;

use super::extract::JsonBody;
use super::{AppState, SearchParams};
use crate::error::AppResult;
use crate::models::{InvoiceDetail, InvoiceInput, InvoicePatch};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<InvoiceDetail>>> {
    Ok(Json(state.invoices.list(params.term()).await?))
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<InvoiceDetail>> {
    Ok(Json(state.invoices.get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<InvoiceInput>,
) -> AppResult<(StatusCode, Json<InvoiceDetail>)> {
    let detail = state.invoices.create(input).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Replaces the header and reconciles the submitted items against the
/// stored ones.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<InvoiceInput>,
) -> AppResult<Json<InvoiceDetail>> {
    Ok(Json(state.invoices.update(id, input).await?))
}

pub async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<InvoicePatch>,
) -> AppResult<Json<InvoiceDetail>> {
    Ok(Json(state.invoices.patch(id, patch).await?))
}

pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.invoices.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
