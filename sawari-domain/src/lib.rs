pub mod booking;
pub mod lock;
pub mod repository;
pub mod seat;
pub mod transaction;

pub use booking::{Booking, BookingStatus};
pub use lock::{LockStatus, Passenger, SeatLock};
pub use seat::{Bus, Deck, Seat, SeatType};
pub use transaction::{PaymentTransaction, TransactionStatus};

/// Boxed storage-layer error, as surfaced by the repository traits.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

pub type DomainResult<T> = Result<T, StoreError>;
