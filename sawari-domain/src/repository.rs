use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::booking::Booking;
use crate::lock::SeatLock;
use crate::seat::{Bus, Seat};
use crate::transaction::{GatewayReference, PaymentTransaction, TransactionStatus};
use crate::StoreError;

/// Authoritative store of seat availability per bus/date.
///
/// The availability flag is mutated only through `reserve` and `release`;
/// both are conditional at the storage layer so that concurrent callers
/// contend on store state, never on process-local locks.
#[async_trait]
pub trait SeatInventory: Send + Sync {
    /// Fetch seat rows by id, in no particular order. Ids with no row are
    /// simply absent from the result.
    async fn seats_by_ids(&self, seat_ids: &[Uuid]) -> Result<Vec<Seat>, StoreError>;

    /// Atomically flip every seat to unavailable, only if all of them are
    /// currently available. Returns false (and changes nothing) when the
    /// compare-and-set loses.
    async fn reserve(&self, seat_ids: &[Uuid]) -> Result<bool, StoreError>;

    /// Flip seats back to available. Idempotent: already-available seats
    /// are a no-op. Returns the number of seats actually flipped.
    async fn release(&self, seat_ids: &[Uuid]) -> Result<u64, StoreError>;

    async fn bus_by_id(&self, bus_id: Uuid) -> Result<Option<Bus>, StoreError>;
}

/// Store of per-seat lock rows (`booking_seats`).
#[async_trait]
pub trait LockRepository: Send + Sync {
    /// Persist all locks of one booking group as a unit (all-or-nothing).
    async fn insert_locks(&self, locks: &[SeatLock]) -> Result<(), StoreError>;

    async fn locks_for_group(&self, booking_group_id: Uuid) -> Result<Vec<SeatLock>, StoreError>;

    /// All LOCKED rows created before `cutoff`.
    async fn find_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<SeatLock>, StoreError>;

    /// Conditional promote: LOCKED -> BOOKED for the whole group. Returns
    /// the number of rows promoted; zero means an expiry raced the payment.
    async fn promote_group(&self, booking_group_id: Uuid) -> Result<u64, StoreError>;

    /// Conditional delete: removes the row only while it is still LOCKED.
    /// Returns whether a row was deleted.
    async fn delete_if_locked(&self, lock_id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, txn: &PaymentTransaction) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<PaymentTransaction>, StoreError>;

    /// Conditional terminal transition: INITIATED -> `status`, storing the
    /// final amounts and gateway metadata. Returns false when the
    /// transaction was no longer INITIATED.
    async fn finalize(
        &self,
        id: Uuid,
        status: TransactionStatus,
        discount: f64,
        total: f64,
        gateway: &GatewayReference,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError>;

    async fn by_pnr(&self, pnr: &str) -> Result<Option<Booking>, StoreError>;

    async fn pnr_exists(&self, pnr: &str) -> Result<bool, StoreError>;
}
