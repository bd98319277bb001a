use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::engine::matching::match_vehicles;
use crate::engine::pricing::price_shipment;
use crate::error::AppError;
use crate::models::quote::CostBreakdown;
use crate::models::shipment::Shipment;
use crate::models::vehicle::VehicleClass;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quotes", post(create_quote))
        .route("/quotes/match", post(match_catalog))
}

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub shipment: Shipment,
    /// Catalog name of a manually chosen vehicle; omitted to let the
    /// matcher pick the cheapest suitable one.
    #[serde(default)]
    pub vehicle: Option<String>,
}

async fn create_quote(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<CostBreakdown>, AppError> {
    let catalog = state
        .catalog
        .read()
        .map_err(|_| AppError::Internal("vehicle catalog lock poisoned".to_string()))?
        .clone();
    let settings = state
        .settings
        .read()
        .map_err(|_| AppError::Internal("settings lock poisoned".to_string()))?
        .clone();

    let chosen = match &payload.vehicle {
        Some(name) => Some(
            catalog
                .iter()
                .find(|vehicle| &vehicle.name == name)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("vehicle {name} not in catalog")))?,
        ),
        None => None,
    };

    let start = Instant::now();
    let result = price_shipment(&payload.shipment, chosen.as_ref(), &catalog, &settings);

    let outcome = match &result {
        Ok(_) => "success",
        Err(AppError::NoSuitableVehicle) => "no_vehicle",
        Err(_) => "invalid",
    };
    state
        .metrics
        .quote_latency_seconds
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());
    state
        .metrics
        .quotes_total
        .with_label_values(&[outcome])
        .inc();

    Ok(Json(result?))
}

async fn match_catalog(
    State(state): State<Arc<AppState>>,
    Json(shipment): Json<Shipment>,
) -> Result<Json<Vec<VehicleClass>>, AppError> {
    shipment.validate()?;

    let catalog = state
        .catalog
        .read()
        .map_err(|_| AppError::Internal("vehicle catalog lock poisoned".to_string()))?;

    Ok(Json(match_vehicles(&shipment, &catalog)))
}
