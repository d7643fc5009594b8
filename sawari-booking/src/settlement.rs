use std::sync::Arc;

use chrono::Utc;
use sawari_domain::repository::{
    BookingRepository, LockRepository, SeatInventory, TransactionRepository,
};
use sawari_domain::transaction::GatewayReference;
use sawari_domain::{Booking, BookingStatus, TransactionStatus};
use sawari_fare::{Coupon, FareEngine};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::pnr::PnrGenerator;

#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    #[error("Transaction {0} is already {1}")]
    InvalidTransactionState(Uuid, &'static str),

    #[error("Payment failed at the gateway; seats remain held until timeout")]
    PaymentFailed,

    #[error("No locked seats found for transaction {0}; payment succeeded but the lock expired")]
    NoLockedSeatsFound(Uuid),

    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayResult {
    Success,
    Failure,
}

#[derive(Debug, Clone)]
pub struct SettleRequest {
    pub transaction_id: Uuid,
    pub gateway_result: GatewayResult,
    pub gateway: GatewayReference,
    pub coupon: Option<Coupon>,
    pub discount_amount: Option<f64>,
}

/// Finalizes a payment attempt: marks the transaction terminal, promotes
/// the locked seats to booked and issues the PNR-bearing booking record.
pub struct SettlementService {
    inventory: Arc<dyn SeatInventory>,
    locks: Arc<dyn LockRepository>,
    transactions: Arc<dyn TransactionRepository>,
    bookings: Arc<dyn BookingRepository>,
    fare: FareEngine,
}

impl SettlementService {
    pub fn new(
        inventory: Arc<dyn SeatInventory>,
        locks: Arc<dyn LockRepository>,
        transactions: Arc<dyn TransactionRepository>,
        bookings: Arc<dyn BookingRepository>,
        fare: FareEngine,
    ) -> Self {
        Self {
            inventory,
            locks,
            transactions,
            bookings,
            fare,
        }
    }

    pub async fn settle(&self, req: SettleRequest) -> Result<Booking, SettlementError> {
        let txn = self
            .transactions
            .get(req.transaction_id)
            .await
            .map_err(|e| SettlementError::Storage(e.to_string()))?
            .ok_or(SettlementError::TransactionNotFound(req.transaction_id))?;

        if txn.status != TransactionStatus::Initiated {
            return Err(SettlementError::InvalidTransactionState(
                txn.id,
                txn.status.as_str(),
            ));
        }

        if req.gateway_result == GatewayResult::Failure {
            // Seats stay locked; the sweeper reclaims them on abandonment.
            self.transactions
                .finalize(txn.id, TransactionStatus::Failed, 0.0, txn.total, &req.gateway)
                .await
                .map_err(|e| SettlementError::Storage(e.to_string()))?;
            info!(transaction_id = %txn.id, "payment failed at gateway");
            return Err(SettlementError::PaymentFailed);
        }

        // 1. Discount: a supplied coupon is validated against the stored
        // base fare; otherwise an explicit amount may be honored as-is.
        let discount = match &req.coupon {
            Some(coupon) => self
                .fare
                .coupon_discount(txn.base_fare, coupon, Utc::now().date_naive())
                .map_err(|e| SettlementError::InvalidCoupon(e.to_string()))?,
            None => req.discount_amount.unwrap_or(0.0).max(0.0),
        };
        let total = self.fare.grand_total(txn.base_fare, txn.gst, discount);

        // 2. Terminal transition, conditional on the row still being
        // INITIATED so a concurrent settle cannot double-apply.
        let finalized = self
            .transactions
            .finalize(txn.id, TransactionStatus::Successful, discount, total, &req.gateway)
            .await
            .map_err(|e| SettlementError::Storage(e.to_string()))?;
        if !finalized {
            return Err(SettlementError::InvalidTransactionState(txn.id, "settled"));
        }

        // 3. Promote the whole group LOCKED -> BOOKED. Zero rows means the
        // sweeper reclaimed the seats first: a paid-but-unfulfilled
        // payment that must surface loudly for manual reconciliation.
        let promoted = self
            .locks
            .promote_group(txn.booking_group_id)
            .await
            .map_err(|e| SettlementError::Storage(e.to_string()))?;
        if promoted == 0 {
            error!(
                transaction_id = %txn.id,
                booking_group_id = %txn.booking_group_id,
                "payment succeeded but no locked seats remain; manual reconciliation required"
            );
            return Err(SettlementError::NoLockedSeatsFound(txn.id));
        }

        let group = self
            .locks
            .locks_for_group(txn.booking_group_id)
            .await
            .map_err(|e| SettlementError::Storage(e.to_string()))?;

        // 4. Route/operator denormalization comes off the first seat's bus.
        let seat_ids: Vec<Uuid> = group.iter().map(|l| l.seat_id).collect();
        let seats = self
            .inventory
            .seats_by_ids(&seat_ids)
            .await
            .map_err(|e| SettlementError::Storage(e.to_string()))?;
        let first_seat = seats
            .first()
            .ok_or(SettlementError::NoLockedSeatsFound(txn.id))?;
        let bus = self
            .inventory
            .bus_by_id(first_seat.bus_id)
            .await
            .map_err(|e| SettlementError::Storage(e.to_string()))?
            .ok_or_else(|| SettlementError::Storage("bus vanished during settlement".into()))?;

        let pnr = PnrGenerator::generate_unique(self.bookings.as_ref())
            .await
            .map_err(|e| SettlementError::Storage(e.to_string()))?;

        let booking = Booking {
            id: Uuid::new_v4(),
            pnr,
            booking_group_id: txn.booking_group_id,
            transaction_id: txn.id,
            bus_id: bus.id,
            operator_name: bus.operator_name.clone(),
            from_city: bus.from_city.clone(),
            to_city: bus.to_city.clone(),
            journey_date: first_seat.journey_date,
            boarding_point: group[0].boarding_point.clone(),
            dropping_point: group[0].dropping_point.clone(),
            seat_labels: group.iter().map(|l| l.seat_label.clone()).collect(),
            passenger_names: group.iter().map(|l| l.passenger_name.clone()).collect(),
            base_fare: txn.base_fare,
            gst: txn.gst,
            discount,
            total,
            status: BookingStatus::Booked,
            created_at: Utc::now(),
        };

        if let Err(e) = self.bookings.insert(&booking).await {
            // Seats are already promoted and the payment captured. There is
            // no compensating path here; flag for manual reconciliation.
            error!(
                transaction_id = %txn.id,
                "booking record creation failed after promotion: {}", e
            );
            return Err(SettlementError::Storage(e.to_string()));
        }

        info!(pnr = %booking.pnr, transaction_id = %txn.id, "booking confirmed");
        Ok(booking)
    }
}
