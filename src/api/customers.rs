use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use validator::Validate;

use super::extract::JsonBody;
use super::{AppState, SearchParams};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{Customer, CustomerInput};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Customer>>> {
    let mut conn = state.pool.acquire().await?;
    let customers = db::customers::list(&mut conn, params.term()).await?;
    Ok(Json(customers))
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Customer>> {
    let mut conn = state.pool.acquire().await?;
    db::customers::find(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("customer", id))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CustomerInput>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    input.validate()?;
    let mut conn = state.pool.acquire().await?;
    let customer = db::customers::insert(&mut conn, &input).await?;
    tracing::info!("Created customer {} ({})", customer.id, customer.name);
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<CustomerInput>,
) -> AppResult<Json<Customer>> {
    input.validate()?;
    let mut conn = state.pool.acquire().await?;
    db::customers::update(&mut conn, id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("customer", id))
}

/// Removes the customer together with its quotations and invoices.
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    let mut tx = state.pool.begin().await?;
    if db::customers::delete(&mut tx, id).await? == 0 {
        return Err(AppError::not_found("customer", id));
    }
    tx.commit().await?;
    tracing::info!("Deleted customer {}", id);
    Ok(StatusCode::NO_CONTENT)
}
