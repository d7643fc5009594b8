use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sawari_domain::{Bus, Deck, LockStatus, Passenger, Seat, SeatType};
use sawari_fare::FareEngine;
use sawari_store::MemoryStore;
use uuid::Uuid;

use crate::lock::{LockError, LockManager, LockRequest};
use crate::settlement::{GatewayResult, SettleRequest, SettlementError, SettlementService};
use crate::sweeper::ExpirySweeper;
use crate::DEFAULT_LOCK_TTL_SECONDS;

struct Harness {
    store: Arc<MemoryStore>,
    manager: LockManager,
    settlement: SettlementService,
    sweeper: ExpirySweeper,
    bus_id: Uuid,
    seats: Vec<Uuid>,
}

fn journey_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
}

fn harness(seat_count: usize) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let bus_id = Uuid::new_v4();
    store.insert_bus(Bus {
        id: bus_id,
        operator_name: "Neo Travels".to_string(),
        from_city: "Bengaluru".to_string(),
        to_city: "Chennai".to_string(),
        gst_percent: None,
        base_fare: 450.0,
    });

    let mut seats = Vec::new();
    for i in 0..seat_count {
        let id = Uuid::new_v4();
        store.insert_seat(Seat {
            id,
            bus_id,
            journey_date: journey_date(),
            label: format!("L{}", i + 1),
            seat_type: SeatType::Sleeper,
            deck: Deck::Lower,
            row: i as i32,
            col: 0,
            base_price: 600.0,
            discounted_price: None,
            ladies_only: false,
            is_available: true,
        });
        seats.push(id);
    }

    let inventory: Arc<MemoryStore> = store.clone();
    let manager = LockManager::new(
        inventory.clone(),
        store.clone(),
        store.clone(),
        FareEngine::default(),
        DEFAULT_LOCK_TTL_SECONDS,
    );
    let settlement = SettlementService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        FareEngine::default(),
    );
    let sweeper = ExpirySweeper::new(store.clone(), store.clone(), DEFAULT_LOCK_TTL_SECONDS);

    Harness {
        store,
        manager,
        settlement,
        sweeper,
        bus_id,
        seats,
    }
}

fn passengers(n: usize) -> Vec<Passenger> {
    (0..n)
        .map(|i| Passenger {
            name: format!("Passenger {}", i + 1),
            age: 30,
            gender: "MALE".to_string(),
        })
        .collect()
}

fn lock_request(h: &Harness, seat_ids: Vec<Uuid>) -> LockRequest {
    let n = seat_ids.len();
    LockRequest {
        bus_id: h.bus_id,
        journey_date: journey_date(),
        seat_ids,
        passengers: passengers(n),
        boarding_point: "Majestic".to_string(),
        dropping_point: "Koyambedu".to_string(),
        contact_mobile: "9876543210".to_string(),
        contact_email: "rider@example.com".to_string(),
    }
}

fn settle_request(transaction_id: Uuid, result: GatewayResult) -> SettleRequest {
    SettleRequest {
        transaction_id,
        gateway_result: result,
        gateway: sawari_domain::transaction::GatewayReference {
            order_id: "order_123".to_string(),
            payment_id: "pay_456".to_string(),
            method: "UPI".to_string(),
        },
        coupon: None,
        discount_amount: None,
    }
}

#[tokio::test]
async fn lock_two_seats_succeeds_and_consumes_availability() {
    let h = harness(2);
    let before = Utc::now();

    let receipt = h.manager.attempt_lock(lock_request(&h, h.seats.clone())).await.unwrap();

    assert_eq!(receipt.seat_ids.len(), 2);
    assert_eq!(receipt.fare.base_fare, 1200.0);
    assert_eq!(receipt.fare.gst, 60.0); // default 5%
    assert_eq!(receipt.fare.total, 1260.0);

    // Expiry is advertised as now + 492s.
    let ttl = (receipt.lock_expires_at - before).num_seconds();
    assert!((491..=494).contains(&ttl), "unexpected ttl: {}", ttl);

    for seat in &h.seats {
        assert_eq!(h.store.seat_available(*seat), Some(false));
    }
}

#[tokio::test]
async fn locking_a_taken_seat_fails_and_touches_nothing() {
    let h = harness(2);
    h.manager
        .attempt_lock(lock_request(&h, vec![h.seats[0]]))
        .await
        .unwrap();
    let locks_before = h.store.lock_count();

    let err = h
        .manager
        .attempt_lock(lock_request(&h, h.seats.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, LockError::SeatsUnavailable));
    assert_eq!(h.store.lock_count(), locks_before);
    // The free seat in the failed request stays available.
    assert_eq!(h.store.seat_available(h.seats[1]), Some(true));
}

#[tokio::test]
async fn concurrent_lock_attempts_have_exactly_one_winner() {
    let h = harness(1);
    let req_a = lock_request(&h, h.seats.clone());
    let req_b = lock_request(&h, h.seats.clone());

    let (a, b) = tokio::join!(h.manager.attempt_lock(req_a), h.manager.attempt_lock(req_b));

    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser.unwrap_err(), LockError::SeatsUnavailable));
}

#[tokio::test]
async fn seat_passenger_mismatch_is_rejected_before_any_mutation() {
    let h = harness(2);
    let mut req = lock_request(&h, h.seats.clone());
    req.passengers.pop();

    let err = h.manager.attempt_lock(req).await.unwrap_err();
    assert!(matches!(err, LockError::SeatCountMismatch { .. }));
    assert_eq!(h.store.seat_available(h.seats[0]), Some(true));
    assert_eq!(h.store.lock_count(), 0);
}

#[tokio::test]
async fn duplicate_seat_ids_are_rejected_before_any_mutation() {
    let h = harness(1);
    // Same physical seat twice, one passenger per entry.
    let req = lock_request(&h, vec![h.seats[0], h.seats[0]]);

    let err = h.manager.attempt_lock(req).await.unwrap_err();
    assert!(matches!(err, LockError::DuplicateSeatIds));
    assert_eq!(h.store.seat_available(h.seats[0]), Some(true));
    assert_eq!(h.store.lock_count(), 0);
}

#[tokio::test]
async fn unknown_bus_is_rejected() {
    let h = harness(1);
    let mut req = lock_request(&h, h.seats.clone());
    req.bus_id = Uuid::new_v4();
    // Seats will not match the bogus bus id either way; bus lookup fires first.
    let err = h.manager.attempt_lock(req).await.unwrap_err();
    assert!(matches!(err, LockError::BusNotFound(_)));
}

#[tokio::test]
async fn expired_lock_is_swept_and_settlement_finds_no_seats() {
    let h = harness(1);
    let receipt = h.manager.attempt_lock(lock_request(&h, h.seats.clone())).await.unwrap();

    // 9 minutes pass, past the 8.2 minute TTL.
    h.store.age_group(receipt.booking_group_id, 540);

    let released = h.sweeper.sweep(Utc::now()).await.unwrap();
    assert_eq!(released, 1);
    assert_eq!(h.store.seat_available(h.seats[0]), Some(true));
    assert_eq!(h.store.lock_count(), 0);

    // The original transaction can no longer settle: the expiry won.
    let err = h
        .settlement
        .settle(settle_request(receipt.transaction_id, GatewayResult::Success))
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::NoLockedSeatsFound(_)));
}

#[tokio::test]
async fn sweep_is_idempotent() {
    let h = harness(1);
    let receipt = h.manager.attempt_lock(lock_request(&h, h.seats.clone())).await.unwrap();
    h.store.age_group(receipt.booking_group_id, 600);

    assert_eq!(h.sweeper.sweep(Utc::now()).await.unwrap(), 1);
    assert_eq!(h.sweeper.sweep(Utc::now()).await.unwrap(), 0);
    assert_eq!(h.store.seat_available(h.seats[0]), Some(true));
}

#[tokio::test]
async fn sweep_ignores_unexpired_and_booked_locks() {
    let h = harness(2);
    let receipt = h.manager.attempt_lock(lock_request(&h, h.seats.clone())).await.unwrap();

    // Fresh locks: nothing to reclaim.
    assert_eq!(h.sweeper.sweep(Utc::now()).await.unwrap(), 0);

    // Booked locks: never reclaimed, no matter how old.
    h.settlement
        .settle(settle_request(receipt.transaction_id, GatewayResult::Success))
        .await
        .unwrap();
    h.store.age_group(receipt.booking_group_id, 3600);
    assert_eq!(h.sweeper.sweep(Utc::now()).await.unwrap(), 0);
    assert_eq!(h.store.seat_available(h.seats[0]), Some(false));
}

use chrono::DateTime;
use sawari_domain::repository::{LockRepository, SeatInventory};
use sawari_domain::{SeatLock, StoreError};

/// Lock store that injects a settlement promote (and optionally a rival
/// reservation of the just-released seat) right before the sweeper's
/// conditional delete, reproducing the narrow window where both sides of
/// the race make progress.
struct PromoteBeforeDelete {
    inner: Arc<MemoryStore>,
    booking_group_id: Uuid,
    seat_id: Uuid,
    rival_reserves: bool,
}

#[async_trait::async_trait]
impl LockRepository for PromoteBeforeDelete {
    async fn insert_locks(&self, locks: &[SeatLock]) -> Result<(), StoreError> {
        self.inner.insert_locks(locks).await
    }

    async fn locks_for_group(&self, booking_group_id: Uuid) -> Result<Vec<SeatLock>, StoreError> {
        self.inner.locks_for_group(booking_group_id).await
    }

    async fn find_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<SeatLock>, StoreError> {
        self.inner.find_expired(cutoff).await
    }

    async fn promote_group(&self, booking_group_id: Uuid) -> Result<u64, StoreError> {
        self.inner.promote_group(booking_group_id).await
    }

    async fn delete_if_locked(&self, lock_id: Uuid) -> Result<bool, StoreError> {
        self.inner.promote_group(self.booking_group_id).await?;
        if self.rival_reserves {
            self.inner.reserve(&[self.seat_id]).await?;
        }
        self.inner.delete_if_locked(lock_id).await
    }
}

fn racing_sweeper(h: &Harness, booking_group_id: Uuid, rival_reserves: bool) -> ExpirySweeper {
    let locks = Arc::new(PromoteBeforeDelete {
        inner: h.store.clone(),
        booking_group_id,
        seat_id: h.seats[0],
        rival_reserves,
    });
    ExpirySweeper::new(h.store.clone(), locks, DEFAULT_LOCK_TTL_SECONDS)
}

#[tokio::test]
async fn sweep_losing_its_delete_to_a_promote_takes_the_seat_back() {
    let h = harness(1);
    let receipt = h.manager.attempt_lock(lock_request(&h, h.seats.clone())).await.unwrap();
    h.store.age_group(receipt.booking_group_id, 600);

    let sweeper = racing_sweeper(&h, receipt.booking_group_id, false);
    assert_eq!(sweeper.sweep(Utc::now()).await.unwrap(), 0);

    // The promoted lock survives and the seat goes back off the market.
    let group = h.store.locks_for_group(receipt.booking_group_id).await.unwrap();
    assert_eq!(group.len(), 1);
    assert!(group.iter().all(|l| l.status == LockStatus::Booked));
    assert_eq!(h.store.seat_available(h.seats[0]), Some(false));
}

#[tokio::test]
async fn sweep_survives_a_rival_grabbing_the_seat_mid_race() {
    let h = harness(1);
    let receipt = h.manager.attempt_lock(lock_request(&h, h.seats.clone())).await.unwrap();
    h.store.age_group(receipt.booking_group_id, 600);

    // A rival reserves the seat between the sweep's release and its
    // compensating re-reserve; the re-reserve loses its compare-and-set.
    let sweeper = racing_sweeper(&h, receipt.booking_group_id, true);
    assert_eq!(sweeper.sweep(Utc::now()).await.unwrap(), 0);

    // The booked lock row is intact and the seat is not reclaimed; the
    // conflict is reported for reconciliation rather than papered over.
    let group = h.store.locks_for_group(receipt.booking_group_id).await.unwrap();
    assert!(group.iter().all(|l| l.status == LockStatus::Booked));
    assert_eq!(h.store.seat_available(h.seats[0]), Some(false));
}

#[tokio::test]
async fn successful_settlement_issues_pnr_and_promotes_locks() {
    let h = harness(2);
    let receipt = h.manager.attempt_lock(lock_request(&h, h.seats.clone())).await.unwrap();

    let booking = h
        .settlement
        .settle(settle_request(receipt.transaction_id, GatewayResult::Success))
        .await
        .unwrap();

    assert_eq!(booking.pnr.len(), 8);
    assert!(booking
        .pnr
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
    assert_eq!(booking.from_city, "Bengaluru");
    assert_eq!(booking.to_city, "Chennai");
    assert_eq!(booking.seat_labels.len(), 2);
    assert_eq!(booking.total, 1260.0);

    let group = sawari_domain::repository::LockRepository::locks_for_group(
        h.store.as_ref(),
        receipt.booking_group_id,
    )
    .await
    .unwrap();
    assert!(group.iter().all(|l| l.status == LockStatus::Booked));

    let stored = sawari_domain::repository::BookingRepository::by_pnr(h.store.as_ref(), &booking.pnr)
        .await
        .unwrap();
    assert!(stored.is_some());

    // Booked seats stay off the market.
    assert_eq!(h.store.seat_available(h.seats[0]), Some(false));
}

#[tokio::test]
async fn settled_transaction_cannot_settle_again() {
    let h = harness(1);
    let receipt = h.manager.attempt_lock(lock_request(&h, h.seats.clone())).await.unwrap();
    h.settlement
        .settle(settle_request(receipt.transaction_id, GatewayResult::Success))
        .await
        .unwrap();

    let err = h
        .settlement
        .settle(settle_request(receipt.transaction_id, GatewayResult::Success))
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::InvalidTransactionState(_, _)));
}

#[tokio::test]
async fn failed_payment_keeps_seats_locked_for_the_sweeper() {
    let h = harness(1);
    let receipt = h.manager.attempt_lock(lock_request(&h, h.seats.clone())).await.unwrap();

    let err = h
        .settlement
        .settle(settle_request(receipt.transaction_id, GatewayResult::Failure))
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::PaymentFailed));

    // Seats stay held; only the TTL sweep frees them.
    assert_eq!(h.store.seat_available(h.seats[0]), Some(false));
    h.store.age_group(receipt.booking_group_id, 600);
    assert_eq!(h.sweeper.sweep(Utc::now()).await.unwrap(), 1);
    assert_eq!(h.store.seat_available(h.seats[0]), Some(true));
}

#[tokio::test]
async fn unknown_transaction_is_rejected() {
    let h = harness(1);
    let err = h
        .settlement
        .settle(settle_request(Uuid::new_v4(), GatewayResult::Success))
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::TransactionNotFound(_)));
}

#[tokio::test]
async fn coupon_discount_reduces_the_total() {
    let h = harness(2);
    let receipt = h.manager.attempt_lock(lock_request(&h, h.seats.clone())).await.unwrap();

    let mut req = settle_request(receipt.transaction_id, GatewayResult::Success);
    req.coupon = Some(sawari_fare::Coupon {
        code: "FEST10".to_string(),
        discount_percent: 10.0,
        max_discount: Some(100.0),
        min_fare: 800.0,
        valid_to: Utc::now().date_naive() + chrono::Duration::days(7),
    });

    let booking = h.settlement.settle(req).await.unwrap();
    // 10% of 1200 = 120, capped at 100.
    assert_eq!(booking.discount, 100.0);
    assert_eq!(booking.total, 1160.0);
}

#[tokio::test]
async fn invalid_coupon_aborts_before_any_state_change() {
    let h = harness(1);
    let receipt = h.manager.attempt_lock(lock_request(&h, h.seats.clone())).await.unwrap();

    let mut req = settle_request(receipt.transaction_id, GatewayResult::Success);
    req.coupon = Some(sawari_fare::Coupon {
        code: "BIGSPEND".to_string(),
        discount_percent: 10.0,
        max_discount: None,
        min_fare: 5000.0,
        valid_to: Utc::now().date_naive() + chrono::Duration::days(7),
    });

    let err = h.settlement.settle(req).await.unwrap_err();
    assert!(matches!(err, SettlementError::InvalidCoupon(_)));

    // Transaction still INITIATED, locks untouched: the caller may retry
    // without the coupon.
    let retry = h
        .settlement
        .settle(settle_request(receipt.transaction_id, GatewayResult::Success))
        .await;
    assert!(retry.is_ok());
}
