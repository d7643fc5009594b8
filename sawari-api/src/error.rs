use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sawari_booking::{LockError, SettlementError, SweepError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    PaymentRequired(String),
    /// Paid-but-unfulfilled settlement; carries the reference the user
    /// should quote to support.
    ReconciliationRequired(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::PaymentRequired(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            AppError::ReconciliationRequired(reference) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "Booking could not be completed, contact support with reference {}",
                    reference
                ),
            ),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<LockError> for AppError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::MissingFields(_)
            | LockError::SeatCountMismatch { .. }
            | LockError::DuplicateSeatIds => {
                AppError::ValidationError(err.to_string())
            }
            LockError::BusNotFound(_) => AppError::NotFoundError(err.to_string()),
            LockError::SeatsUnavailable => {
                AppError::ConflictError("Seats unavailable, please reselect".to_string())
            }
            LockError::LockPersistFailed(msg) | LockError::Storage(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::TransactionNotFound(_) => AppError::NotFoundError(err.to_string()),
            SettlementError::InvalidTransactionState(_, _) => {
                AppError::ConflictError(err.to_string())
            }
            SettlementError::PaymentFailed => AppError::PaymentRequired(
                "Payment failed, your seats remain held until timeout".to_string(),
            ),
            SettlementError::NoLockedSeatsFound(txn_id) => {
                AppError::ReconciliationRequired(txn_id.to_string())
            }
            SettlementError::InvalidCoupon(msg) => AppError::ValidationError(msg),
            SettlementError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<SweepError> for AppError {
    fn from(err: SweepError) -> Self {
        match err {
            SweepError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn seats_unavailable_maps_to_conflict() {
        let resp = AppError::from(LockError::SeatsUnavailable).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn payment_failure_maps_to_402() {
        let resp = AppError::from(SettlementError::PaymentFailed).into_response();
        assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn lost_locks_surface_the_transaction_reference() {
        let txn_id = Uuid::new_v4();
        let err = AppError::from(SettlementError::NoLockedSeatsFound(txn_id));
        match err {
            AppError::ReconciliationRequired(reference) => {
                assert_eq!(reference, txn_id.to_string())
            }
            other => panic!("unexpected mapping: {:?}", other),
        }
    }
}
