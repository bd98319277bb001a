use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::error::AppError;
use crate::settings::PricingSettings;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}

async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PricingSettings>, AppError> {
    let settings = state
        .settings
        .read()
        .map_err(|_| AppError::Internal("settings lock poisoned".to_string()))?;

    Ok(Json(settings.clone()))
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PricingSettings>,
) -> Result<Json<PricingSettings>, AppError> {
    payload.validate()?;

    let mut settings = state
        .settings
        .write()
        .map_err(|_| AppError::Internal("settings lock poisoned".to_string()))?;
    *settings = payload;

    Ok(Json(settings.clone()))
}
