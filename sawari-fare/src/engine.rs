use chrono::NaiveDate;
use sawari_domain::{Bus, Seat};
use serde::{Deserialize, Serialize};

use crate::coupon::Coupon;
use crate::FareError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareConfig {
    /// GST rate used when the operator has no configured rate.
    pub default_gst_percent: f64,

    /// Last-resort per-seat fare when neither the seat nor the bus carries
    /// price data.
    pub fallback_seat_fare: f64,
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            default_gst_percent: 5.0,
            fallback_seat_fare: 500.0,
        }
    }
}

/// Computed fare totals for one booking group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FareBreakdown {
    pub base_fare: f64,
    pub gst: f64,
    pub discount: f64,
    pub total: f64,
}

/// Pure fare math: seat totals, GST, coupon discounts, clamped grand total.
pub struct FareEngine {
    config: FareConfig,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl FareEngine {
    pub fn new(config: FareConfig) -> Self {
        Self { config }
    }

    /// Fare charged for a single seat: discounted price, else base price,
    /// else the bus-level fare, else the configured fallback.
    pub fn seat_fare(&self, seat: &Seat, bus_fallback_fare: f64) -> f64 {
        let fallback = if bus_fallback_fare > 0.0 {
            bus_fallback_fare
        } else {
            self.config.fallback_seat_fare
        };
        seat.effective_price().unwrap_or(fallback)
    }

    /// Sum of per-seat effective prices; seats with no price data fall back
    /// to the bus-level base fare, then to the configured fallback.
    pub fn seat_total(&self, seats: &[Seat], bus_fallback_fare: f64) -> f64 {
        seats
            .iter()
            .map(|s| self.seat_fare(s, bus_fallback_fare))
            .sum::<f64>()
            .max(0.0)
    }

    /// GST on the base fare, rounded to 2 decimal places.
    pub fn gst_amount(&self, base_fare: f64, gst_percent: Option<f64>) -> f64 {
        let pct = gst_percent.unwrap_or(self.config.default_gst_percent);
        round2(base_fare * pct / 100.0)
    }

    /// Discount for `coupon` applied to `fare`, capped by `max_discount`.
    pub fn coupon_discount(
        &self,
        fare: f64,
        coupon: &Coupon,
        today: NaiveDate,
    ) -> Result<f64, FareError> {
        if coupon.is_expired(today) {
            return Err(FareError::InvalidCoupon(format!(
                "coupon {} expired on {}",
                coupon.code, coupon.valid_to
            )));
        }
        if fare < coupon.min_fare {
            return Err(FareError::InvalidCoupon(format!(
                "coupon {} requires a minimum fare of {}",
                coupon.code, coupon.min_fare
            )));
        }

        let raw = fare * coupon.discount_percent / 100.0;
        let capped = match coupon.max_discount {
            Some(cap) => raw.min(cap),
            None => raw,
        };
        Ok(round2(capped))
    }

    /// Final amount payable, clamped so it never goes negative.
    pub fn grand_total(&self, base_fare: f64, gst: f64, discount: f64) -> f64 {
        round2((base_fare + gst - discount).max(0.0))
    }

    /// Assemble the full breakdown for a set of seats on a bus, using the
    /// operator's GST rate where configured.
    pub fn quote(&self, seats: &[Seat], bus: &Bus) -> FareBreakdown {
        let base_fare = round2(self.seat_total(seats, bus.base_fare));
        let gst = self.gst_amount(base_fare, bus.gst_percent);
        let total = self.grand_total(base_fare, gst, 0.0);
        FareBreakdown {
            base_fare,
            gst,
            discount: 0.0,
            total,
        }
    }
}

impl Default for FareEngine {
    fn default() -> Self {
        Self::new(FareConfig::default())
    }
}
