use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatType {
    Sleeper,
    Seater,
}

impl SeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatType::Sleeper => "SLEEPER",
            SeatType::Seater => "SEATER",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "SLEEPER" => SeatType::Sleeper,
            _ => SeatType::Seater,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Deck {
    Lower,
    Upper,
}

impl Deck {
    pub fn as_str(&self) -> &'static str {
        match self {
            Deck::Lower => "LOWER",
            Deck::Upper => "UPPER",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "UPPER" => Deck::Upper,
            _ => Deck::Lower,
        }
    }
}

/// A bookable unit on a specific bus + journey date.
///
/// `is_available` is the single source of truth for whether the seat can be
/// locked. It is flipped to false only by the lock manager's conditional
/// reserve and back to true only by the sweeper / cancellation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub bus_id: Uuid,
    pub journey_date: NaiveDate,
    pub label: String,
    pub seat_type: SeatType,
    pub deck: Deck,
    pub row: i32,
    pub col: i32,
    pub base_price: f64,
    pub discounted_price: Option<f64>,
    pub ladies_only: bool,
    pub is_available: bool,
}

impl Seat {
    /// Price charged when this seat is locked: discounted price if the
    /// operator set one, else the seat's base price.
    pub fn effective_price(&self) -> Option<f64> {
        self.discounted_price.or(Some(self.base_price)).filter(|p| *p > 0.0)
    }
}

/// Operator/route metadata for a bus, denormalized into bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bus {
    pub id: Uuid,
    pub operator_name: String,
    pub from_city: String,
    pub to_city: String,
    /// Operator-configured GST rate; the fare engine falls back to the
    /// configured default when absent.
    pub gst_percent: Option<f64>,
    /// Fallback fare for seats carrying no price data of their own.
    pub base_fare: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn seat(base: f64, discounted: Option<f64>) -> Seat {
        Seat {
            id: Uuid::new_v4(),
            bus_id: Uuid::new_v4(),
            journey_date: Utc::now().date_naive(),
            label: "L5".to_string(),
            seat_type: SeatType::Sleeper,
            deck: Deck::Lower,
            row: 1,
            col: 2,
            base_price: base,
            discounted_price: discounted,
            ladies_only: false,
            is_available: true,
        }
    }

    #[test]
    fn effective_price_prefers_discounted() {
        assert_eq!(seat(900.0, Some(750.0)).effective_price(), Some(750.0));
        assert_eq!(seat(900.0, None).effective_price(), Some(900.0));
    }

    #[test]
    fn effective_price_none_when_unpriced() {
        assert_eq!(seat(0.0, None).effective_price(), None);
    }
}
