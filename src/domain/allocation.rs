//! Atomic reserve seam between the slot registry and the booking ledger
//!
//! The occupancy flip and the ledger insert must commit or roll back as one
//! unit, so the reserve operation lives behind its own storage trait instead
//! of being composed from the per-aggregate repositories.

use async_trait::async_trait;

use crate::domain::booking::Booking;
use crate::shared::DomainResult;

#[async_trait]
pub trait AllocationStore: Send + Sync {
    /// Atomically claim `booking.slot_numbers` and insert the booking.
    ///
    /// The claim re-checks `is_booked = false` at write time; under
    /// concurrent reservers targeting overlapping sets at most one caller
    /// wins each slot. Losers get `DomainError::SlotConflict` carrying the
    /// exact set of slots that were no longer free, and no state changes.
    async fn reserve(&self, booking: Booking) -> DomainResult<Booking>;
}
