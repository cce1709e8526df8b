//! Slot inventory provisioning endpoint

use axum::extract::State;
use axum::Json;
use validator::Validate;

use super::{error_response, AppState, HandlerError};
use crate::api::dto::{ApiResponse, ProvisionRequest, ProvisionedDto};
use crate::shared::DomainError;

/// Provision slot inventory for a charging point
///
/// Creates the fixed half-hour slot grid for one point. Provisioning is
/// one-shot: a point with existing slots returns 409.
#[utoipa::path(
    post,
    path = "/api/v1/admin/points/provision",
    tag = "Provisioning",
    request_body = ProvisionRequest,
    responses(
        (status = 200, description = "Inventory created", body = ApiResponse<ProvisionedDto>),
        (status = 409, description = "Point already provisioned")
    ),
    security(("bearer_auth" = []))
)]
pub async fn provision_point(
    State(state): State<AppState>,
    Json(request): Json<ProvisionRequest>,
) -> Result<Json<ApiResponse<ProvisionedDto>>, HandlerError> {
    request
        .validate()
        .map_err(|e| error_response(DomainError::Validation(e.to_string())))?;
    let slots_created = state
        .provisioning
        .provision_point(&request.station_id, &request.point_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(ProvisionedDto {
        station_id: request.station_id,
        point_id: request.point_id,
        slots_created,
    })))
}
