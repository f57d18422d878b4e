pub mod customers;
pub mod email;
pub mod extract;
pub mod handlers;
pub mod incoming_goods;
pub mod invoices;
pub mod motors;
pub mod quotations;
pub mod suppliers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use crate::service::{ForeignIdPolicy, InvoiceService, Mailer, QuotationService};

/// Attachments up to this size are accepted by `/api/send-email`.
const MAX_EMAIL_BODY: usize = 20 * 1024 * 1024;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub quotations: Arc<QuotationService>,
    pub invoices: Arc<InvoiceService>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(pool: PgPool, policy: ForeignIdPolicy, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            quotations: Arc::new(QuotationService::new(pool.clone(), policy)),
            invoices: Arc::new(InvoiceService::new(pool.clone(), policy)),
            pool,
            mailer,
        }
    }
}

/// `?search=` filter accepted by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

impl SearchParams {
    /// The search term, or `None` when absent or blank.
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Build the router with every endpoint.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/customer", get(customers::list).post(customers::create))
        .route(
            "/api/customer/:id",
            get(customers::retrieve)
                .put(customers::update)
                .delete(customers::destroy),
        )
        .route("/api/suppliers", get(suppliers::list).post(suppliers::create))
        .route(
            "/api/suppliers/:id",
            get(suppliers::retrieve)
                .put(suppliers::update)
                .delete(suppliers::destroy),
        )
        .route(
            "/api/incoming-goods",
            get(incoming_goods::list).post(incoming_goods::create),
        )
        .route(
            "/api/incoming-goods/:id",
            get(incoming_goods::retrieve)
                .put(incoming_goods::update)
                .delete(incoming_goods::destroy),
        )
        .route("/api/quotations", get(quotations::list).post(quotations::create))
        .route(
            "/api/quotations/:id",
            get(quotations::retrieve)
                .put(quotations::update)
                .patch(quotations::partial_update)
                .delete(quotations::destroy),
        )
        .route("/api/invoices", get(invoices::list).post(invoices::create))
        .route(
            "/api/invoices/:id",
            get(invoices::retrieve)
                .put(invoices::update)
                .patch(invoices::partial_update)
                .delete(invoices::destroy),
        )
        .route("/api/motors", get(motors::list).post(motors::create))
        .route(
            "/api/motors/:id",
            get(motors::retrieve)
                .put(motors::update)
                .delete(motors::destroy),
        )
        .route(
            "/api/send-email",
            post(email::send_email).layer(DefaultBodyLimit::max(MAX_EMAIL_BODY)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The router wrapped so that `/api/customer/` and `/api/customer` match
/// the same route.
pub fn app(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
