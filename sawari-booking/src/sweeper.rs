use std::sync::Arc;

use chrono::{DateTime, Utc};
use sawari_domain::repository::{LockRepository, SeatInventory};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Background reclamation of expired seat locks.
///
/// Per expired lock the seat is released first and the lock row deleted
/// second; the lock row is the only link back to the seat, so deleting
/// before releasing would strand the seat as permanently unavailable.
/// Individual failures are logged and skipped so one bad row cannot stall
/// the whole sweep.
pub struct ExpirySweeper {
    inventory: Arc<dyn SeatInventory>,
    locks: Arc<dyn LockRepository>,
    ttl_seconds: u64,
}

impl ExpirySweeper {
    pub fn new(
        inventory: Arc<dyn SeatInventory>,
        locks: Arc<dyn LockRepository>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            inventory,
            locks,
            ttl_seconds,
        }
    }

    /// Release every LOCKED row older than the TTL. Returns the number of
    /// lock rows reclaimed. Safe to run concurrently with itself and with
    /// live settlements: release is a no-op on already-available seats and
    /// the delete is conditional on the row still being LOCKED.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<u64, SweepError> {
        let cutoff = now - chrono::Duration::seconds(self.ttl_seconds as i64);
        let expired = self
            .locks
            .find_expired(cutoff)
            .await
            .map_err(|e| SweepError::Storage(e.to_string()))?;

        let mut released = 0u64;
        for lock in expired {
            // Release must precede delete. A seat left unavailable with its
            // lock row intact is recovered by the next pass; the reverse is
            // unrecoverable.
            if let Err(e) = self.inventory.release(&[lock.seat_id]).await {
                warn!(lock_id = %lock.id, seat_id = %lock.seat_id,
                    "sweep could not release seat, will retry next pass: {}", e);
                continue;
            }

            match self.locks.delete_if_locked(lock.id).await {
                Ok(true) => released += 1,
                Ok(false) => {
                    // Settlement promoted the row between our read and the
                    // delete; the conditional write lost cleanly. Take the
                    // seat back off the market, it belongs to the booking.
                    debug!(lock_id = %lock.id, "expired lock already promoted or removed");
                    match self.inventory.reserve(&[lock.seat_id]).await {
                        Ok(true) => {}
                        Ok(false) => {
                            // Another customer grabbed the seat in the window
                            // between our release and this re-reserve. Two
                            // parties now hold one seat; needs manual
                            // reconciliation.
                            error!(lock_id = %lock.id, seat_id = %lock.seat_id,
                                "seat double-sold: booked seat was re-reserved by another party during sweep");
                        }
                        Err(e) => {
                            warn!(seat_id = %lock.seat_id,
                                "could not re-reserve seat for promoted lock: {}", e);
                        }
                    }
                }
                Err(e) => {
                    warn!(lock_id = %lock.id, "sweep could not delete lock row: {}", e);
                }
            }
        }

        if released > 0 {
            info!(released, "expiry sweep reclaimed locked seats");
        }
        Ok(released)
    }
}
