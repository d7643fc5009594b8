pub mod coupon;
pub mod engine;

pub use coupon::Coupon;
pub use engine::{FareBreakdown, FareConfig, FareEngine};

#[derive(Debug, thiserror::Error)]
pub enum FareError {
    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),
}
