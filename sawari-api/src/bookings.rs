use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sawari_domain::Booking;
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub released_count: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/sweep", post(sweep_expired))
        .route("/v1/bookings/{pnr}", get(get_booking))
}

/// POST /v1/bookings/sweep
/// Release every lock past its TTL. Idempotent; also runs on a schedule
/// from the background worker.
async fn sweep_expired(State(state): State<AppState>) -> Result<Json<SweepResponse>, AppError> {
    let released_count = state.sweeper.sweep(Utc::now()).await?;
    Ok(Json(SweepResponse { released_count }))
}

/// GET /v1/bookings/:pnr
async fn get_booking(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .by_pnr(&pnr)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("No booking with PNR {}", pnr)))?;

    Ok(Json(booking))
}
