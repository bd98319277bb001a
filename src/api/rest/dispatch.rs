use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;

use crate::engine::allocation::{allocate_zones, ZoneAssignment};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dispatch/allocate", post(allocate))
}

async fn allocate(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ZoneAssignment>>, AppError> {
    let assignments = allocate_zones(&state).await?;
    Ok(Json(assignments))
}
