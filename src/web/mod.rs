//! HTTP surface: routes, form handling and the JSON response envelope.

pub mod forms;
pub mod handlers;
pub mod response;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{Next, from_fn},
    response::Response,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::time::Instant;
use tracing::info;

/// State shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Connection pool
    pub db: DatabaseConnection,
}

/// Logs method, path, status and latency of every request.
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis(),
        "Handled request"
    );
    response
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/kpis", get(handlers::list_indicators))
        .route(
            "/kpi/create",
            get(handlers::create_form).post(handlers::create_indicator),
        )
        .route(
            "/kpi/edit/{id}",
            get(handlers::edit_form).post(handlers::edit_indicator),
        )
        .route("/kpi/{id}/evaluate", post(handlers::evaluate))
        .route("/kpi/{id}/children", get(handlers::children))
        .route("/health", get(handlers::health))
        .layer(from_fn(log_request))
        .with_state(state)
}
