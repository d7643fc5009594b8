use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Booked,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "BOOKED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "CANCELLED" => BookingStatus::Cancelled,
            _ => BookingStatus::Booked,
        }
    }
}

/// The permanent record created once per successful transaction. Immutable
/// after creation except for cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub pnr: String,
    pub booking_group_id: Uuid,
    pub transaction_id: Uuid,
    pub bus_id: Uuid,
    pub operator_name: String,
    pub from_city: String,
    pub to_city: String,
    pub journey_date: NaiveDate,
    pub boarding_point: String,
    pub dropping_point: String,
    pub seat_labels: Vec<String>,
    pub passenger_names: Vec<String>,
    pub base_fare: f64,
    pub gst: f64,
    pub discount: f64,
    pub total: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}
