//! Slot availability endpoint

use axum::extract::{Query, State};
use axum::Json;

use super::{error_response, AppState, HandlerError};
use crate::api::dto::{ApiResponse, AvailabilityQuery, SlotAvailabilityDto};

/// Free slots of a charging point
///
/// Returns the currently free slots for one point, ascending by slot
/// number, each with its half-hour time window. A point with no
/// provisioned slots returns an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/availability",
    tag = "Availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free slots, ascending", body = ApiResponse<Vec<SlotAvailabilityDto>>)
    )
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<Vec<SlotAvailabilityDto>>>, HandlerError> {
    let free = state
        .allocation
        .query_availability(&query.station_id, &query.point_id)
        .await
        .map_err(error_response)?;

    let slots = free
        .into_iter()
        .map(|s| SlotAvailabilityDto {
            slot_number: s.slot_number,
            start_time: s.start_time,
            end_time: s.end_time,
        })
        .collect();
    Ok(Json(ApiResponse::success(slots)))
}
