//! Booking endpoints

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use log::info;
use validator::Validate;

use super::{error_response, AppState, HandlerError};
use crate::api::dto::{
    ApiResponse, BookingDto, CreateBookingRequest, GuestCountDto, StationBookingsQuery,
    UpdateStatusRequest,
};
use crate::application::services::ReserveCommand;
use crate::domain::booking::BookingStatus;
use crate::domain::Identity;
use crate::shared::DomainError;

/// Create a booking
///
/// Atomically claims the requested slot set and records a confirmed
/// booking. Fails with 409 and the conflicting slot numbers if any
/// requested slot is already taken, and with 403 when a guest identity
/// has exhausted its daily quota.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking confirmed", body = ApiResponse<BookingDto>),
        (status = 400, description = "Invalid slot selection or date"),
        (status = 409, description = "One or more slots already booked"),
        (status = 403, description = "Guest daily booking limit reached")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, HandlerError> {
    request
        .validate()
        .map_err(|e| error_response(DomainError::Validation(e.to_string())))?;
    let selection = request.selection().map_err(error_response)?;

    info!(
        "Booking request: user={} station={} point={} slots={:?}",
        identity.user_id,
        request.station_id,
        request.point_id,
        selection.numbers()
    );

    let booking = state
        .allocation
        .reserve(ReserveCommand {
            station_id: request.station_id,
            station_name: request.station_name,
            point_id: request.point_id,
            booking_date: request.booking_date,
            identity,
            selection,
            vehicle_type: request.vehicle_type,
            charger_type: request.charger_type,
        })
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(BookingDto::from_domain(booking))))
}

/// Update booking status
///
/// Transitions a confirmed booking to `completed` or `cancelled` and
/// frees its slots. Both target states are terminal.
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}/status",
    tag = "Bookings",
    params(("id" = String, Path, description = "Booking ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Booking updated", body = ApiResponse<BookingDto>),
        (status = 400, description = "Invalid or repeated transition"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, HandlerError> {
    let booking = state
        .lifecycle
        .update_status(&id, &request.status, request.reason)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(BookingDto::from_domain(booking))))
}

/// Booking history of the authenticated user
///
/// All bookings tied to the caller's phone number, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/me",
    tag = "Bookings",
    responses(
        (status = 200, description = "Booking history", body = ApiResponse<Vec<BookingDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, HandlerError> {
    let bookings = state
        .repos
        .bookings()
        .find_by_user_phone(&identity.phone)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from_domain).collect(),
    )))
}

/// Active bookings of the authenticated user
///
/// Only `confirmed` bookings; terminal ones are excluded.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/me/active",
    tag = "Bookings",
    responses(
        (status = 200, description = "Active bookings", body = ApiResponse<Vec<BookingDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_active_bookings(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, HandlerError> {
    let bookings = state
        .repos
        .bookings()
        .find_active_by_user_phone(&identity.phone)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from_domain).collect(),
    )))
}

/// Guest quota usage for today
///
/// Returns how many bookings the authenticated guest has placed today
/// and the daily limit. Always `0` for non-guest identities.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/guest-count",
    tag = "Bookings",
    responses(
        (status = 200, description = "Today's usage", body = ApiResponse<GuestCountDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn guest_booking_count(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ApiResponse<GuestCountDto>>, HandlerError> {
    let quota = state.allocation.quota();
    let count = quota.count_today(&identity).await;
    Ok(Json(ApiResponse::success(GuestCountDto {
        count,
        max_per_day: quota.max_per_day(),
    })))
}

/// Bookings of a station
///
/// Lists a station's bookings, optionally filtered by date and status.
#[utoipa::path(
    get,
    path = "/api/v1/stations/{station_id}/bookings",
    tag = "Bookings",
    params(
        ("station_id" = String, Path, description = "Station ID"),
        StationBookingsQuery
    ),
    responses(
        (status = 200, description = "Station bookings", body = ApiResponse<Vec<BookingDto>>),
        (status = 400, description = "Unknown status filter")
    ),
    security(("bearer_auth" = []))
)]
pub async fn station_bookings(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
    Query(query): Query<StationBookingsQuery>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, HandlerError> {
    let status = match query.status.as_deref() {
        None => None,
        Some(s) => Some(BookingStatus::parse(s).ok_or_else(|| {
            error_response(DomainError::Validation(format!("Unknown status '{}'", s)))
        })?),
    };

    let bookings = state
        .repos
        .bookings()
        .find_for_station(&station_id, query.date, status)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from_domain).collect(),
    )))
}
