pub mod deliveries;
pub mod dispatch;
pub mod drivers;
pub mod quotes;
pub mod settings;
pub mod vehicles;
pub mod ws;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(quotes::router())
        .merge(vehicles::router())
        .merge(deliveries::router())
        .merge(drivers::router())
        .merge(dispatch::router())
        .merge(settings::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .fallback_service(ServeDir::new("static"))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    deliveries: usize,
    pending_deliveries: usize,
    drivers: usize,
    vehicles: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let vehicles = state
        .catalog
        .read()
        .map(|catalog| catalog.len())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "ok",
        deliveries: state.deliveries.len(),
        pending_deliveries: state.pending_delivery_count(),
        drivers: state.drivers.len(),
        vehicles,
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
