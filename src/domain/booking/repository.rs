//! Booking ledger repository interface
//!
//! The ledger is append-mostly: rows are inserted by the allocation store
//! (inside the atomic reserve transaction) and only their status fields
//! change afterwards. Nothing is ever deleted.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::model::{Booking, BookingStatus};
use crate::shared::DomainResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find a booking by its ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>>;

    /// Persist a status change (status, cancellation_reason, updated_at)
    async fn update(&self, booking: Booking) -> DomainResult<()>;

    /// Booking history for a user, newest first
    async fn find_by_user_phone(&self, phone: &str) -> DomainResult<Vec<Booking>>;

    /// Confirmed bookings for a user, newest first
    async fn find_active_by_user_phone(&self, phone: &str) -> DomainResult<Vec<Booking>>;

    /// Bookings at a station, optionally filtered by date and status,
    /// ascending by booking time
    async fn find_for_station(
        &self,
        station_id: &str,
        date: Option<NaiveDate>,
        status: Option<BookingStatus>,
    ) -> DomainResult<Vec<Booking>>;

    /// Count bookings created by a user at or after `since` (guest quota)
    async fn count_for_user_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<u64>;

    /// Bulk-cancel confirmed bookings dated `date` with the given reason
    /// (no-show sweep). Returns the number of bookings cancelled.
    async fn cancel_confirmed_on(&self, date: NaiveDate, reason: &str) -> DomainResult<u64>;
}
