//! API Handlers

pub mod availability;
pub mod bookings;
pub mod health;
pub mod provisioning;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use crate::api::dto::ApiResponse;
use crate::application::services::{AllocationService, LifecycleService, ProvisioningService};
use crate::domain::RepositoryProvider;
use crate::shared::DomainError;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub allocation: Arc<AllocationService>,
    pub lifecycle: Arc<LifecycleService>,
    pub provisioning: Arc<ProvisioningService>,
}

/// Map a domain error to the HTTP status + envelope every handler returns.
pub(crate) fn error_response(e: DomainError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &e {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) | DomainError::SlotConflict { .. } => StatusCode::CONFLICT,
        DomainError::QuotaExceeded { .. } => StatusCode::FORBIDDEN,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    // SlotConflict carries the conflict set so clients can re-render the
    // slot grid without a second availability call.
    let body = match &e {
        DomainError::SlotConflict { conflicting } => json!({
            "success": false,
            "error": e.to_string(),
            "conflicting_slots": conflicting,
        }),
        DomainError::QuotaExceeded { current, max } => json!({
            "success": false,
            "error": e.to_string(),
            "current": current,
            "max": max,
        }),
        _ => serde_json::to_value(ApiResponse::<()>::error(e.to_string()))
            .unwrap_or_else(|_| json!({"success": false})),
    };

    (status, Json(body))
}

pub type HandlerError = (StatusCode, Json<serde_json::Value>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        let cases = [
            (
                DomainError::NotFound {
                    entity: "Booking",
                    field: "id",
                    value: "x".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (DomainError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (DomainError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                DomainError::SlotConflict {
                    conflicting: vec![3],
                },
                StatusCode::CONFLICT,
            ),
            (
                DomainError::QuotaExceeded { current: 2, max: 2 },
                StatusCode::FORBIDDEN,
            ),
            (DomainError::Storage("io".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let (status, _) = error_response(err);
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn slot_conflict_body_lists_slots() {
        let (_, Json(body)) = error_response(DomainError::SlotConflict {
            conflicting: vec![3, 4],
        });
        assert_eq!(body["success"], false);
        assert_eq!(body["conflicting_slots"], serde_json::json!([3, 4]));
    }
}
