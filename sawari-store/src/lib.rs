pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod lock_repo;
pub mod memory;
pub mod seat_repo;
pub mod transaction_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use lock_repo::PgLockRepository;
pub use memory::MemoryStore;
pub use seat_repo::PgSeatInventory;
pub use transaction_repo::PgTransactionRepository;
