use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use sawari_booking::{LockReceipt, LockRequest};
use sawari_domain::Passenger;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LockSeatsRequest {
    pub bus_id: Uuid,
    pub journey_date: NaiveDate,
    pub seat_ids: Vec<Uuid>,
    pub passengers: Vec<PassengerInput>,
    pub boarding_point: String,
    pub dropping_point: String,
    pub contact_mobile: String,
    pub contact_email: String,
}

#[derive(Debug, Deserialize)]
pub struct PassengerInput {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

#[derive(Debug, Serialize)]
pub struct LockSeatsResponse {
    pub booking_group_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub transaction_id: Uuid,
    pub total_base_fare: f64,
    pub gst: f64,
    pub total_fare: f64,
    pub lock_expires_at: DateTime<Utc>,
}

impl From<LockReceipt> for LockSeatsResponse {
    fn from(receipt: LockReceipt) -> Self {
        Self {
            booking_group_id: receipt.booking_group_id,
            seat_ids: receipt.seat_ids,
            transaction_id: receipt.transaction_id,
            total_base_fare: receipt.fare.base_fare,
            gst: receipt.fare.gst,
            total_fare: receipt.fare.total,
            lock_expires_at: receipt.lock_expires_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/bookings/lock", post(lock_seats))
}

/// POST /v1/bookings/lock
/// Hold the requested seats for one payment window.
async fn lock_seats(
    State(state): State<AppState>,
    Json(req): Json<LockSeatsRequest>,
) -> Result<Json<LockSeatsResponse>, AppError> {
    let receipt = state
        .lock_manager
        .attempt_lock(LockRequest {
            bus_id: req.bus_id,
            journey_date: req.journey_date,
            seat_ids: req.seat_ids,
            passengers: req
                .passengers
                .into_iter()
                .map(|p| Passenger {
                    name: p.name,
                    age: p.age,
                    gender: p.gender,
                })
                .collect(),
            boarding_point: req.boarding_point,
            dropping_point: req.dropping_point,
            contact_mobile: req.contact_mobile,
            contact_email: req.contact_email,
        })
        .await?;

    Ok(Json(receipt.into()))
}
