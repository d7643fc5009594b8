use std::sync::Arc;

use sawari_booking::{ExpirySweeper, LockManager, SettlementService};
use sawari_domain::repository::BookingRepository;

#[derive(Clone)]
pub struct AppState {
    pub lock_manager: Arc<LockManager>,
    pub settlement: Arc<SettlementService>,
    pub sweeper: Arc<ExpirySweeper>,
    pub bookings: Arc<dyn BookingRepository>,
}
