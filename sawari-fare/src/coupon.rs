use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Percentage coupon with an optional absolute cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub discount_percent: f64,
    /// Absolute ceiling on the discount; uncapped when absent.
    pub max_discount: Option<f64>,
    /// Minimum base fare the coupon applies to.
    pub min_fare: f64,
    pub valid_to: NaiveDate,
}

impl Coupon {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.valid_to < today
    }
}
