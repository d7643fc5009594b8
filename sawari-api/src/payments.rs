use axum::{extract::State, routing::post, Json, Router};
use chrono::NaiveDate;
use sawari_booking::settlement::{GatewayResult, SettleRequest};
use sawari_domain::transaction::GatewayReference;
use sawari_domain::Booking;
use sawari_fare::Coupon;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SettlePaymentRequest {
    pub transaction_id: Uuid,
    pub gateway_result: GatewayResult,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub payment_method: String,
    /// Coupon terms as resolved by the storefront; expiry and minimum fare
    /// are re-validated server-side before any state changes.
    pub coupon: Option<CouponInput>,
    pub discount_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CouponInput {
    pub code: String,
    pub discount_percent: f64,
    pub max_discount: Option<f64>,
    pub min_fare: f64,
    pub valid_to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct FareSummary {
    pub base: f64,
    pub gst: f64,
    pub discount: f64,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct SettlePaymentResponse {
    pub pnr: String,
    pub seats: Vec<String>,
    pub passengers: Vec<String>,
    pub from_city: String,
    pub to_city: String,
    pub journey_date: NaiveDate,
    pub boarding_point: String,
    pub dropping_point: String,
    pub fare: FareSummary,
}

impl From<Booking> for SettlePaymentResponse {
    fn from(b: Booking) -> Self {
        Self {
            pnr: b.pnr,
            seats: b.seat_labels,
            passengers: b.passenger_names,
            from_city: b.from_city,
            to_city: b.to_city,
            journey_date: b.journey_date,
            boarding_point: b.boarding_point,
            dropping_point: b.dropping_point,
            fare: FareSummary {
                base: b.base_fare,
                gst: b.gst,
                discount: b.discount,
                total: b.total,
            },
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/payments/settle", post(settle_payment))
}

/// POST /v1/payments/settle
/// Consume the gateway's verdict for a pending transaction: confirm the
/// booking on success, mark the transaction failed otherwise.
async fn settle_payment(
    State(state): State<AppState>,
    Json(req): Json<SettlePaymentRequest>,
) -> Result<Json<SettlePaymentResponse>, AppError> {
    let booking = state
        .settlement
        .settle(SettleRequest {
            transaction_id: req.transaction_id,
            gateway_result: req.gateway_result,
            gateway: GatewayReference {
                order_id: req.gateway_order_id,
                payment_id: req.gateway_payment_id,
                method: req.payment_method,
            },
            coupon: req.coupon.map(|c| Coupon {
                code: c.code,
                discount_percent: c.discount_percent,
                max_discount: c.max_discount,
                min_fare: c.min_fare,
                valid_to: c.valid_to,
            }),
            discount_amount: req.discount_amount,
        })
        .await?;

    Ok(Json(booking.into()))
}
