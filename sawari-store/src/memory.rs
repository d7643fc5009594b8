use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use sawari_domain::repository::{
    BookingRepository, LockRepository, SeatInventory, TransactionRepository,
};
use sawari_domain::transaction::GatewayReference;
use sawari_domain::{
    Booking, Bus, LockStatus, PaymentTransaction, Seat, SeatLock, StoreError, TransactionStatus,
};

#[derive(Default)]
struct Inner {
    buses: HashMap<Uuid, Bus>,
    seats: HashMap<Uuid, Seat>,
    locks: HashMap<Uuid, SeatLock>,
    transactions: HashMap<Uuid, PaymentTransaction>,
    bookings: Vec<Booking>,
}

/// In-memory store implementing every repository trait behind one mutex,
/// giving the same conditional-update semantics as the Postgres backend.
/// Used by the test suites and as a standalone dev backend.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_bus(&self, bus: Bus) {
        self.inner.lock().unwrap().buses.insert(bus.id, bus);
    }

    pub fn insert_seat(&self, seat: Seat) {
        self.inner.lock().unwrap().seats.insert(seat.id, seat);
    }

    pub fn seat_available(&self, seat_id: Uuid) -> Option<bool> {
        self.inner
            .lock()
            .unwrap()
            .seats
            .get(&seat_id)
            .map(|s| s.is_available)
    }

    pub fn lock_count(&self) -> usize {
        self.inner.lock().unwrap().locks.len()
    }

    pub fn lock_status(&self, lock_id: Uuid) -> Option<LockStatus> {
        self.inner
            .lock()
            .unwrap()
            .locks
            .get(&lock_id)
            .map(|l| l.status)
    }

    /// Test hook: backdate every lock of a group, as if the TTL elapsed.
    pub fn age_group(&self, booking_group_id: Uuid, seconds: i64) {
        let mut inner = self.inner.lock().unwrap();
        for lock in inner.locks.values_mut() {
            if lock.booking_group_id == booking_group_id {
                lock.created_at -= chrono::Duration::seconds(seconds);
            }
        }
    }
}

#[async_trait]
impl SeatInventory for MemoryStore {
    async fn seats_by_ids(&self, seat_ids: &[Uuid]) -> Result<Vec<Seat>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(seat_ids
            .iter()
            .filter_map(|id| inner.seats.get(id).cloned())
            .collect())
    }

    async fn reserve(&self, seat_ids: &[Uuid]) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        let all_available = seat_ids
            .iter()
            .all(|id| inner.seats.get(id).map(|s| s.is_available).unwrap_or(false));
        if !all_available {
            return Ok(false);
        }

        for id in seat_ids {
            if let Some(seat) = inner.seats.get_mut(id) {
                seat.is_available = false;
            }
        }
        Ok(true)
    }

    async fn release(&self, seat_ids: &[Uuid]) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let mut flipped = 0u64;
        for id in seat_ids {
            if let Some(seat) = inner.seats.get_mut(id) {
                if !seat.is_available {
                    seat.is_available = true;
                    flipped += 1;
                }
            }
        }
        Ok(flipped)
    }

    async fn bus_by_id(&self, bus_id: Uuid) -> Result<Option<Bus>, StoreError> {
        Ok(self.inner.lock().unwrap().buses.get(&bus_id).cloned())
    }
}

#[async_trait]
impl LockRepository for MemoryStore {
    async fn insert_locks(&self, locks: &[SeatLock]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        for lock in locks {
            inner.locks.insert(lock.id, lock.clone());
        }
        Ok(())
    }

    async fn locks_for_group(&self, booking_group_id: Uuid) -> Result<Vec<SeatLock>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut group: Vec<SeatLock> = inner
            .locks
            .values()
            .filter(|l| l.booking_group_id == booking_group_id)
            .cloned()
            .collect();
        group.sort_by_key(|l| l.created_at);
        Ok(group)
    }

    async fn find_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<SeatLock>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .locks
            .values()
            .filter(|l| l.status == LockStatus::Locked && l.created_at < cutoff)
            .cloned()
            .collect())
    }

    async fn promote_group(&self, booking_group_id: Uuid) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let mut promoted = 0u64;
        for lock in inner.locks.values_mut() {
            if lock.booking_group_id == booking_group_id && lock.status == LockStatus::Locked {
                lock.status = LockStatus::Booked;
                promoted += 1;
            }
        }
        Ok(promoted)
    }

    async fn delete_if_locked(&self, lock_id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let deletable = inner
            .locks
            .get(&lock_id)
            .map(|l| l.status == LockStatus::Locked)
            .unwrap_or(false);
        if deletable {
            inner.locks.remove(&lock_id);
        }
        Ok(deletable)
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn insert(&self, txn: &PaymentTransaction) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .transactions
            .insert(txn.id, txn.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PaymentTransaction>, StoreError> {
        Ok(self.inner.lock().unwrap().transactions.get(&id).cloned())
    }

    async fn finalize(
        &self,
        id: Uuid,
        status: TransactionStatus,
        discount: f64,
        total: f64,
        gateway: &GatewayReference,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.transactions.get_mut(&id) {
            Some(txn) if txn.status == TransactionStatus::Initiated => {
                txn.status = status;
                txn.discount = discount;
                txn.total = total;
                txn.payment_method = Some(gateway.method.clone());
                txn.gateway_order_id = Some(gateway.order_id.clone());
                txn.gateway_payment_id = Some(gateway.payment_id.clone());
                txn.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.bookings.iter().any(|b| b.pnr == booking.pnr) {
            return Err(format!("duplicate PNR {}", booking.pnr).into());
        }
        inner.bookings.push(booking.clone());
        Ok(())
    }

    async fn by_pnr(&self, pnr: &str) -> Result<Option<Booking>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.bookings.iter().find(|b| b.pnr == pnr).cloned())
    }

    async fn pnr_exists(&self, pnr: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.bookings.iter().any(|b| b.pnr == pnr))
    }
}
