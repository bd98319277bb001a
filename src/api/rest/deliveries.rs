use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::lifecycle::{apply_event, LifecycleEvent};
use crate::error::AppError;
use crate::models::delivery::Delivery;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/deliveries", post(create_delivery).get(list_deliveries))
        .route("/deliveries/:id", get(get_delivery))
        .route("/deliveries/:id/events", post(apply_delivery_event))
}

#[derive(Deserialize)]
pub struct CreateDeliveryRequest {
    pub package_id: Uuid,
    pub postal_code: String,
}

#[derive(Deserialize)]
pub struct DeliveryEventRequest {
    pub event: LifecycleEvent,
    #[serde(default)]
    pub driver_id: Option<Uuid>,
}

async fn create_delivery(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateDeliveryRequest>,
) -> Result<Json<Delivery>, AppError> {
    if payload.postal_code.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "postal_code cannot be empty".to_string(),
        ));
    }

    let delivery = Delivery::new(payload.package_id, payload.postal_code.trim().to_string());
    state.deliveries.insert(delivery.id, delivery.clone());
    state
        .metrics
        .pending_deliveries
        .set(state.pending_delivery_count() as i64);

    Ok(Json(delivery))
}

async fn get_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    let delivery = state
        .deliveries
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("delivery {} not found", id)))?;

    Ok(Json(delivery.value().clone()))
}

async fn list_deliveries(State(state): State<Arc<AppState>>) -> Json<Vec<Delivery>> {
    let deliveries = state
        .deliveries
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    Json(deliveries)
}

async fn apply_delivery_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeliveryEventRequest>,
) -> Result<Json<Delivery>, AppError> {
    let delivery = apply_event(&state, id, payload.event, payload.driver_id)?;
    Ok(Json(delivery))
}
