use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;

use crate::error::AppError;
use crate::models::vehicle::VehicleClass;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/vehicles", post(add_vehicle).get(list_vehicles))
}

async fn add_vehicle(
    State(state): State<Arc<AppState>>,
    Json(vehicle): Json<VehicleClass>,
) -> Result<Json<VehicleClass>, AppError> {
    vehicle.validate()?;

    let mut catalog = state
        .catalog
        .write()
        .map_err(|_| AppError::Internal("vehicle catalog lock poisoned".to_string()))?;

    if catalog.iter().any(|existing| existing.name == vehicle.name) {
        return Err(AppError::InvalidInput(format!(
            "vehicle {} already in catalog",
            vehicle.name
        )));
    }

    catalog.push(vehicle.clone());
    Ok(Json(vehicle))
}

async fn list_vehicles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VehicleClass>>, AppError> {
    let catalog = state
        .catalog
        .read()
        .map_err(|_| AppError::Internal("vehicle catalog lock poisoned".to_string()))?;

    Ok(Json(catalog.clone()))
}
