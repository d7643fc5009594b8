use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a single locked seat.
///
/// `Locked -> Booked` (settlement) and `Locked -> deleted` (expiry sweep)
/// are mutually exclusive terminal transitions; both are performed with
/// status-conditional writes so the loser fails visibly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockStatus {
    Locked,
    Booked,
    Cancelled,
}

impl LockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockStatus::Locked => "LOCKED",
            LockStatus::Booked => "BOOKED",
            LockStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "BOOKED" => LockStatus::Booked,
            "CANCELLED" => LockStatus::Cancelled,
            _ => LockStatus::Locked,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// One row per seat within an in-progress reservation attempt. All rows of
/// one attempt share a `booking_group_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatLock {
    pub id: Uuid,
    pub booking_group_id: Uuid,
    pub seat_id: Uuid,
    pub seat_label: String,
    pub passenger_name: String,
    pub passenger_age: i32,
    pub passenger_gender: String,
    pub boarding_point: String,
    pub dropping_point: String,
    pub fare: f64,
    pub status: LockStatus,
    pub created_at: DateTime<Utc>,
}

impl SeatLock {
    pub fn new(
        booking_group_id: Uuid,
        seat_id: Uuid,
        seat_label: String,
        passenger: &Passenger,
        boarding_point: String,
        dropping_point: String,
        fare: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_group_id,
            seat_id,
            seat_label,
            passenger_name: passenger.name.clone(),
            passenger_age: passenger.age,
            passenger_gender: passenger.gender.clone(),
            boarding_point,
            dropping_point,
            fare,
            status: LockStatus::Locked,
            created_at: Utc::now(),
        }
    }

    /// A lock older than `ttl_seconds` is expired and must not be promoted.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl_seconds: u64) -> bool {
        self.status == LockStatus::Locked
            && self.created_at + chrono::Duration::seconds(ttl_seconds as i64) < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lock() -> SeatLock {
        let passenger = Passenger {
            name: "Asha Rao".to_string(),
            age: 29,
            gender: "FEMALE".to_string(),
        };
        SeatLock::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "U3".to_string(),
            &passenger,
            "Majestic".to_string(),
            "Koyambedu".to_string(),
            850.0,
        )
    }

    #[test]
    fn new_lock_starts_locked_and_unexpired() {
        let lock = sample_lock();
        assert_eq!(lock.status, LockStatus::Locked);
        assert!(!lock.is_expired(Utc::now(), 492));
    }

    #[test]
    fn lock_expires_after_ttl() {
        let mut lock = sample_lock();
        lock.created_at = Utc::now() - chrono::Duration::seconds(540);
        assert!(lock.is_expired(Utc::now(), 492));
    }

    #[test]
    fn booked_lock_never_expires() {
        let mut lock = sample_lock();
        lock.created_at = Utc::now() - chrono::Duration::seconds(3600);
        lock.status = LockStatus::Booked;
        assert!(!lock.is_expired(Utc::now(), 492));
    }
}
