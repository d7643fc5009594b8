use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment attempt status. Transitions only INITIATED -> SUCCESSFUL or
/// INITIATED -> FAILED; a terminal transaction is never reopened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Initiated,
    Successful,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Initiated => "INITIATED",
            TransactionStatus::Successful => "SUCCESSFUL",
            TransactionStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "SUCCESSFUL" => TransactionStatus::Successful,
            "FAILED" => TransactionStatus::Failed,
            _ => TransactionStatus::Initiated,
        }
    }
}

/// One per payment attempt, aggregating every locked seat in a booking
/// group. Holds the fare totals computed at lock time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: Uuid,
    pub booking_group_id: Uuid,
    pub contact_mobile: String,
    pub contact_email: String,
    pub base_fare: f64,
    pub gst: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_method: Option<String>,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentTransaction {
    pub fn initiate(
        booking_group_id: Uuid,
        contact_mobile: String,
        contact_email: String,
        base_fare: f64,
        gst: f64,
        total: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            booking_group_id,
            contact_mobile,
            contact_email,
            base_fare,
            gst,
            discount: 0.0,
            total,
            payment_method: None,
            gateway_order_id: None,
            gateway_payment_id: None,
            status: TransactionStatus::Initiated,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Gateway metadata captured when a transaction settles either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayReference {
    pub order_id: String,
    pub payment_id: String,
    pub method: String,
}
