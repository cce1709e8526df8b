//! Booking domain entity

use chrono::{DateTime, NaiveDate, Utc};

use super::selection::SlotSelection;
use crate::domain::identity::Identity;

/// Booking lifecycle status
///
/// `Confirmed` is the only non-terminal state; a confirmed booking may be
/// completed or cancelled, after which no further transition is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parse a status string; unknown values are rejected by the caller.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Completed and cancelled are terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One reservation of contiguous slots at a charging point.
///
/// Bookings are never deleted; completed and cancelled rows stay in the
/// ledger as audit history.
#[derive(Debug, Clone)]
pub struct Booking {
    /// UUID v4
    pub id: String,
    pub station_id: String,
    pub station_name: String,
    pub point_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_phone: String,
    pub vehicle_type: String,
    pub charger_type: String,
    /// Contiguous ascending slot numbers, 1..=4 entries
    pub slot_numbers: Vec<i32>,
    /// Calendar day the reservation is for (canonical ISO date)
    pub booking_date: NaiveDate,
    /// When the reservation was placed
    pub booking_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub cancellation_reason: Option<String>,
    /// Total reserved time in hours (slots x slot duration)
    pub duration_hours: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Build a new confirmed booking from a validated slot selection.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        station_id: impl Into<String>,
        station_name: impl Into<String>,
        point_id: impl Into<String>,
        identity: &Identity,
        selection: &SlotSelection,
        booking_date: NaiveDate,
        vehicle_type: impl Into<String>,
        charger_type: impl Into<String>,
        slot_minutes: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            station_id: station_id.into(),
            station_name: station_name.into(),
            point_id: point_id.into(),
            user_id: identity.user_id.clone(),
            user_name: identity.name.clone(),
            user_phone: identity.phone.clone(),
            vehicle_type: vehicle_type.into(),
            charger_type: charger_type.into(),
            slot_numbers: selection.numbers().to_vec(),
            booking_date,
            booking_time: now,
            status: BookingStatus::Confirmed,
            cancellation_reason: None,
            duration_hours: selection.duration_hours(slot_minutes),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_identity() -> Identity {
        Identity {
            user_id: "U001".to_string(),
            name: "Asha".to_string(),
            phone: "9990001111".to_string(),
            is_guest: false,
        }
    }

    fn sample_booking() -> Booking {
        let selection = SlotSelection::from_numbers(vec![10, 11]).unwrap();
        Booking::new(
            "ST001",
            "Green Charge Hub",
            "P1",
            &sample_identity(),
            &selection,
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            "car",
            "CCS",
            30,
        )
    }

    #[test]
    fn new_booking_is_confirmed() {
        let b = sample_booking();
        assert_eq!(b.status, BookingStatus::Confirmed);
        assert!(b.is_active());
        assert_eq!(b.slot_numbers, vec![10, 11]);
        assert!(b.cancellation_reason.is_none());
    }

    #[test]
    fn duration_is_half_hour_per_slot() {
        let b = sample_booking();
        assert!((b.duration_hours - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn status_parse_roundtrip() {
        for status in &[
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(BookingStatus::parse("pending"), None);
    }

    #[test]
    fn terminal_states() {
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
    }
}
