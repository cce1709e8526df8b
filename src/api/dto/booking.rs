//! Booking API DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::booking::{Booking, SlotSelection};
use crate::shared::{DomainError, DomainResult};

/// Booking creation request
///
/// `slot_numbers` accepts either a JSON array of integers (`[3, 4]`) or a
/// delimited string (`"3,4"` / `"[3, 4]"`); both normalize to the same
/// ascending set.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, message = "station_id must not be empty"))]
    pub station_id: String,
    #[validate(length(min = 1, message = "station_name must not be empty"))]
    pub station_name: String,
    #[validate(length(min = 1, message = "point_id must not be empty"))]
    pub point_id: String,
    /// Booking date, `YYYY-MM-DD`
    #[schema(value_type = String, example = "2026-08-24")]
    pub booking_date: NaiveDate,
    /// Slot numbers: array of integers or a comma-delimited string
    #[schema(value_type = Object)]
    pub slot_numbers: serde_json::Value,
    pub vehicle_type: String,
    pub charger_type: String,
}

impl CreateBookingRequest {
    /// Normalize `slot_numbers` into a validated selection.
    pub fn selection(&self) -> DomainResult<SlotSelection> {
        match &self.slot_numbers {
            serde_json::Value::Array(values) => {
                let numbers = values
                    .iter()
                    .map(|v| {
                        v.as_i64().map(|n| n as i32).ok_or_else(|| {
                            DomainError::Validation(format!("Invalid slot number: {}", v))
                        })
                    })
                    .collect::<DomainResult<Vec<i32>>>()?;
                SlotSelection::from_numbers(numbers)
            }
            serde_json::Value::String(s) => SlotSelection::parse_str(s),
            other => Err(DomainError::Validation(format!(
                "slot_numbers must be an array or string, got {}",
                other
            ))),
        }
    }
}

/// Booking status update request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Target status: `completed` or `cancelled`
    #[schema(example = "cancelled")]
    pub status: String,
    /// Cancellation reason, used only when cancelling
    pub reason: Option<String>,
}

/// Booking as returned to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDto {
    pub id: String,
    pub station_id: String,
    pub station_name: String,
    pub point_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_phone: String,
    pub vehicle_type: String,
    pub charger_type: String,
    pub slot_numbers: Vec<i32>,
    /// `YYYY-MM-DD`
    #[schema(value_type = String)]
    pub booking_date: NaiveDate,
    /// When the reservation was placed
    pub booking_time: DateTime<Utc>,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub duration_hours: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingDto {
    pub fn from_domain(b: Booking) -> Self {
        Self {
            id: b.id,
            station_id: b.station_id,
            station_name: b.station_name,
            point_id: b.point_id,
            user_id: b.user_id,
            user_name: b.user_name,
            user_phone: b.user_phone,
            vehicle_type: b.vehicle_type,
            charger_type: b.charger_type,
            slot_numbers: b.slot_numbers,
            booking_date: b.booking_date,
            booking_time: b.booking_time,
            status: b.status.as_str().to_string(),
            cancellation_reason: b.cancellation_reason,
            duration_hours: b.duration_hours,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// One free slot of a charging point
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotAvailabilityDto {
    pub slot_number: i32,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
}

/// Availability query parameters
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct AvailabilityQuery {
    pub station_id: String,
    pub point_id: String,
}

/// Station booking listing filters
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct StationBookingsQuery {
    /// Filter by booking date, `YYYY-MM-DD`
    #[param(value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    /// Filter by status: `confirmed`, `completed` or `cancelled`
    pub status: Option<String>,
}

/// Guest quota usage for the current day
#[derive(Debug, Serialize, ToSchema)]
pub struct GuestCountDto {
    /// Bookings the guest has placed today
    pub count: u64,
    /// Daily guest limit
    pub max_per_day: u64,
}

/// Slot inventory provisioning request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProvisionRequest {
    #[validate(length(min = 1, message = "station_id must not be empty"))]
    pub station_id: String,
    #[validate(length(min = 1, message = "point_id must not be empty"))]
    pub point_id: String,
}

/// Provisioning result
#[derive(Debug, Serialize, ToSchema)]
pub struct ProvisionedDto {
    pub station_id: String,
    pub point_id: String,
    pub slots_created: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(slot_numbers: serde_json::Value) -> CreateBookingRequest {
        CreateBookingRequest {
            station_id: "ST001".into(),
            station_name: "Green Charge Hub".into(),
            point_id: "P1".into(),
            booking_date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            slot_numbers,
            vehicle_type: "car".into(),
            charger_type: "CCS".into(),
        }
    }

    #[test]
    fn selection_accepts_array_and_string_forms() {
        assert_eq!(
            request(json!([4, 3])).selection().unwrap().numbers(),
            &[3, 4]
        );
        assert_eq!(
            request(json!("[3, 4]")).selection().unwrap().numbers(),
            &[3, 4]
        );
        assert_eq!(request(json!("7")).selection().unwrap().numbers(), &[7]);
    }

    #[test]
    fn selection_rejects_other_json_shapes() {
        assert!(request(json!(3)).selection().is_err());
        assert!(request(json!({"a": 1})).selection().is_err());
        assert!(request(json!([1, "x"])).selection().is_err());
    }
}
