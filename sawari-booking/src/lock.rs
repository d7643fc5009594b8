use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sawari_domain::repository::{LockRepository, SeatInventory, TransactionRepository};
use sawari_domain::{Passenger, PaymentTransaction, SeatLock};
use sawari_fare::{FareBreakdown, FareEngine};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Missing required field: {0}")]
    MissingFields(String),

    #[error("Seat/passenger count mismatch: {seats} seats, {passengers} passengers")]
    SeatCountMismatch { seats: usize, passengers: usize },

    #[error("The same seat was requested more than once")]
    DuplicateSeatIds,

    #[error("Bus not found: {0}")]
    BusNotFound(Uuid),

    #[error("One or more requested seats are no longer available")]
    SeatsUnavailable,

    #[error("Failed to persist lock records: {0}")]
    LockPersistFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockRequest {
    pub bus_id: Uuid,
    pub journey_date: NaiveDate,
    pub seat_ids: Vec<Uuid>,
    pub passengers: Vec<Passenger>,
    pub boarding_point: String,
    pub dropping_point: String,
    pub contact_mobile: String,
    pub contact_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LockReceipt {
    pub booking_group_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub transaction_id: Uuid,
    pub fare: FareBreakdown,
    pub lock_expires_at: DateTime<Utc>,
}

/// Orchestrates a reservation attempt: validates the request, wins (or
/// loses) the seat-availability compare-and-set, persists the lock rows and
/// opens the payment transaction with the quoted totals.
pub struct LockManager {
    inventory: Arc<dyn SeatInventory>,
    locks: Arc<dyn LockRepository>,
    transactions: Arc<dyn TransactionRepository>,
    fare: FareEngine,
    ttl_seconds: u64,
}

impl LockManager {
    pub fn new(
        inventory: Arc<dyn SeatInventory>,
        locks: Arc<dyn LockRepository>,
        transactions: Arc<dyn TransactionRepository>,
        fare: FareEngine,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            inventory,
            locks,
            transactions,
            fare,
            ttl_seconds,
        }
    }

    pub async fn attempt_lock(&self, req: LockRequest) -> Result<LockReceipt, LockError> {
        validate(&req)?;

        // 1. Bus metadata (operator GST rate, route, fallback fare)
        let bus = self
            .inventory
            .bus_by_id(req.bus_id)
            .await
            .map_err(|e| LockError::Storage(e.to_string()))?
            .ok_or(LockError::BusNotFound(req.bus_id))?;

        // 2. Seat rows; a missing id means the seat does not exist for this
        // bus/date and the selection is stale.
        let seats = self
            .inventory
            .seats_by_ids(&req.seat_ids)
            .await
            .map_err(|e| LockError::Storage(e.to_string()))?;
        if seats.len() != req.seat_ids.len() || seats.iter().any(|s| s.bus_id != req.bus_id) {
            return Err(LockError::SeatsUnavailable);
        }

        // 3. Atomic all-or-nothing reserve. Losing the CAS changes nothing.
        let won = self
            .inventory
            .reserve(&req.seat_ids)
            .await
            .map_err(|e| LockError::Storage(e.to_string()))?;
        if !won {
            return Err(LockError::SeatsUnavailable);
        }

        let seats_by_id: HashMap<Uuid, _> = seats.iter().map(|s| (s.id, s)).collect();
        let booking_group_id = Uuid::new_v4();

        // 4. One lock row per seat+passenger pair, inserted as a unit.
        let lock_rows: Vec<SeatLock> = req
            .seat_ids
            .iter()
            .zip(req.passengers.iter())
            .map(|(seat_id, passenger)| {
                let seat = seats_by_id[seat_id];
                SeatLock::new(
                    booking_group_id,
                    *seat_id,
                    seat.label.clone(),
                    passenger,
                    req.boarding_point.clone(),
                    req.dropping_point.clone(),
                    self.fare.seat_fare(seat, bus.base_fare),
                )
            })
            .collect();

        if let Err(e) = self.locks.insert_locks(&lock_rows).await {
            // Hand the seats back so inventory and lock rows stay in step.
            if let Err(release_err) = self.inventory.release(&req.seat_ids).await {
                warn!(
                    booking_group_id = %booking_group_id,
                    "failed to release seats after lock insert failure: {}", release_err
                );
            }
            return Err(LockError::LockPersistFailed(e.to_string()));
        }

        // 5. Quote and open the payment transaction.
        let fare = self.fare.quote(&seats, &bus);
        let txn = PaymentTransaction::initiate(
            booking_group_id,
            req.contact_mobile.clone(),
            req.contact_email.clone(),
            fare.base_fare,
            fare.gst,
            fare.total,
        );
        if let Err(e) = self.transactions.insert(&txn).await {
            self.unwind_locks(&lock_rows, &req.seat_ids).await;
            return Err(LockError::LockPersistFailed(e.to_string()));
        }

        let lock_expires_at = Utc::now() + chrono::Duration::seconds(self.ttl_seconds as i64);
        info!(
            booking_group_id = %booking_group_id,
            transaction_id = %txn.id,
            seats = req.seat_ids.len(),
            "seats locked until {}", lock_expires_at
        );

        Ok(LockReceipt {
            booking_group_id,
            seat_ids: req.seat_ids,
            transaction_id: txn.id,
            fare,
            lock_expires_at,
        })
    }

    /// Best-effort compensation when a step fails after the seats were
    /// reserved: drop the lock rows, then hand the seats back.
    async fn unwind_locks(&self, lock_rows: &[SeatLock], seat_ids: &[Uuid]) {
        for lock in lock_rows {
            if let Err(e) = self.locks.delete_if_locked(lock.id).await {
                warn!(lock_id = %lock.id, "failed to unwind lock row: {}", e);
            }
        }
        if let Err(e) = self.inventory.release(seat_ids).await {
            warn!("failed to release seats during unwind: {}", e);
        }
    }
}

fn validate(req: &LockRequest) -> Result<(), LockError> {
    if req.seat_ids.is_empty() {
        return Err(LockError::MissingFields("seat_ids".to_string()));
    }
    // The same physical seat listed twice would otherwise produce two lock
    // rows and double fare against a single availability flag.
    let distinct: HashSet<&Uuid> = req.seat_ids.iter().collect();
    if distinct.len() != req.seat_ids.len() {
        return Err(LockError::DuplicateSeatIds);
    }
    if req.seat_ids.len() != req.passengers.len() {
        return Err(LockError::SeatCountMismatch {
            seats: req.seat_ids.len(),
            passengers: req.passengers.len(),
        });
    }
    for (field, value) in [
        ("boarding_point", &req.boarding_point),
        ("dropping_point", &req.dropping_point),
        ("contact_mobile", &req.contact_mobile),
        ("contact_email", &req.contact_email),
    ] {
        if value.trim().is_empty() {
            return Err(LockError::MissingFields(field.to_string()));
        }
    }
    if req.passengers.iter().any(|p| p.name.trim().is_empty()) {
        return Err(LockError::MissingFields("passenger name".to_string()));
    }
    Ok(())
}
