#[cfg(test)]
mod lifecycle_tests;
pub mod lock;
pub mod pnr;
pub mod settlement;
pub mod sweeper;

pub use lock::{LockError, LockManager, LockReceipt, LockRequest};
pub use pnr::{PnrError, PnrGenerator};
pub use settlement::{SettleRequest, SettlementError, SettlementService};
pub use sweeper::{ExpirySweeper, SweepError};

/// Seconds a lock stays valid before the sweeper may reclaim it.
/// 8.2 minutes, matching the advertised `lock_expires_at`.
pub const DEFAULT_LOCK_TTL_SECONDS: u64 = 492;
