//! Slot domain entity

use chrono::{DateTime, Utc};

/// One bookable fixed-duration unit at a charging point.
///
/// Slots are pre-generated inventory: created once when a point is
/// provisioned and never deleted during normal operation. Only the
/// allocation engine and the daily reset toggle `is_booked`.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Station the slot belongs to
    pub station_id: String,
    /// Point ID, unique within the station
    pub point_id: String,
    /// Slot number, 1-based, unique within (station, point)
    pub slot_number: i32,
    /// Start time of day, "HH:MM"
    pub start_time: String,
    /// End time of day, "HH:MM"
    pub end_time: String,
    /// Whether an active booking currently holds this slot
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    pub fn new(
        station_id: impl Into<String>,
        point_id: impl Into<String>,
        slot_number: i32,
        slot_minutes: u32,
    ) -> Self {
        let (start_time, end_time) = slot_window(slot_number, slot_minutes);
        let now = Utc::now();
        Self {
            station_id: station_id.into(),
            point_id: point_id.into(),
            slot_number,
            start_time,
            end_time,
            is_booked: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Compute the "HH:MM" window for a 1-based slot number.
///
/// Slot 1 starts at 00:00; the last slot of a 24h schedule ends at 00:00
/// the next day (rendered as "00:00").
pub fn slot_window(slot_number: i32, slot_minutes: u32) -> (String, String) {
    let start = (slot_number as u32 - 1) * slot_minutes;
    let end = start + slot_minutes;
    (format_minutes(start), format_minutes(end))
}

fn format_minutes(total: u32) -> String {
    format!("{:02}:{:02}", (total / 60) % 24, total % 60)
}
