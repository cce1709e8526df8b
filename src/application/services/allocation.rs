//! Availability & allocation engine
//!
//! Owns the reserve flow: quota gate, validated slot selection, then the
//! atomic claim-and-book step in the allocation store. Slot occupancy is
//! mutated only here and in the lifecycle/daily-reset paths.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::quota::GuestQuotaGate;
use crate::config::BookingConfig;
use crate::domain::booking::{Booking, SlotSelection};
use crate::domain::{Identity, RepositoryProvider};
use crate::shared::{DomainError, DomainResult};

/// One free slot, as reported to clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAvailability {
    pub slot_number: i32,
    pub start_time: String,
    pub end_time: String,
}

/// Validated reservation request
#[derive(Debug, Clone)]
pub struct ReserveCommand {
    pub station_id: String,
    pub station_name: String,
    pub point_id: String,
    pub booking_date: NaiveDate,
    pub identity: Identity,
    pub selection: SlotSelection,
    pub vehicle_type: String,
    pub charger_type: String,
}

pub struct AllocationService {
    repos: Arc<dyn RepositoryProvider>,
    quota: GuestQuotaGate,
    slot_minutes: u32,
}

impl AllocationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, config: &BookingConfig) -> Self {
        Self {
            quota: GuestQuotaGate::new(repos.clone(), config.guest_daily_limit),
            repos,
            slot_minutes: config.slot_minutes,
        }
    }

    pub fn quota(&self) -> &GuestQuotaGate {
        &self.quota
    }

    /// Free slots for a point, ascending by slot number. Pure read.
    pub async fn query_availability(
        &self,
        station_id: &str,
        point_id: &str,
    ) -> DomainResult<Vec<SlotAvailability>> {
        let free = self.repos.slots().find_free(station_id, point_id).await?;
        Ok(free
            .into_iter()
            .map(|s| SlotAvailability {
                slot_number: s.slot_number,
                start_time: s.start_time,
                end_time: s.end_time,
            })
            .collect())
    }

    /// Reserve a contiguous slot set and create a confirmed booking.
    ///
    /// Fails fast with `QuotaExceeded` or `SlotConflict` before/without
    /// mutating anything; on success the claim and ledger insert have
    /// committed together.
    pub async fn reserve(&self, cmd: ReserveCommand) -> DomainResult<Booking> {
        self.quota.check(&cmd.identity).await?;

        let booking = Booking::new(
            cmd.station_id,
            cmd.station_name,
            cmd.point_id,
            &cmd.identity,
            &cmd.selection,
            cmd.booking_date,
            cmd.vehicle_type,
            cmd.charger_type,
            self.slot_minutes,
        );

        match self.repos.allocations().reserve(booking).await {
            Ok(booked) => {
                metrics::counter!("bookings_created_total").increment(1);
                info!(
                    booking_id = %booked.id,
                    station = %booked.station_id,
                    point = %booked.point_id,
                    slots = ?booked.slot_numbers,
                    "Booking confirmed"
                );
                Ok(booked)
            }
            Err(e) => {
                if matches!(e, DomainError::SlotConflict { .. }) {
                    metrics::counter!("booking_conflicts_total").increment(1);
                }
                Err(e)
            }
        }
    }

    /// Free the slots held by a booking. Idempotent.
    pub async fn release(&self, booking: &Booking) -> DomainResult<()> {
        self.repos
            .slots()
            .release(&booking.station_id, &booking.point_id, &booking.slot_numbers)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    use crate::domain::slot::Slot;
    use crate::infrastructure::storage::MemoryRepositoryProvider;

    fn config() -> BookingConfig {
        BookingConfig::default()
    }

    fn identity() -> Identity {
        Identity::new("U001", "Asha", "9990001111", false)
    }

    fn command(slots: Vec<i32>) -> ReserveCommand {
        ReserveCommand {
            station_id: "ST001".to_string(),
            station_name: "Green Charge Hub".to_string(),
            point_id: "P1".to_string(),
            booking_date: Local::now().date_naive(),
            identity: identity(),
            selection: SlotSelection::from_numbers(slots).unwrap(),
            vehicle_type: "car".to_string(),
            charger_type: "CCS".to_string(),
        }
    }

    async fn service_with_slots(count: i32) -> (AllocationService, Arc<MemoryRepositoryProvider>) {
        let repos = Arc::new(MemoryRepositoryProvider::new());
        let slots = (1..=count).map(|n| Slot::new("ST001", "P1", n, 30)).collect();
        repos.slots().insert_many(slots).await.unwrap();
        (AllocationService::new(repos.clone(), &config()), repos)
    }

    #[tokio::test]
    async fn reserve_removes_slots_from_availability() {
        let (service, _) = service_with_slots(16).await;

        let booking = service.reserve(command(vec![10, 11])).await.unwrap();
        assert_eq!(booking.slot_numbers, vec![10, 11]);

        let free = service.query_availability("ST001", "P1").await.unwrap();
        let numbers: Vec<i32> = free.iter().map(|s| s.slot_number).collect();
        assert!(!numbers.contains(&10));
        assert!(!numbers.contains(&11));
        assert_eq!(numbers.len(), 14);
    }

    #[tokio::test]
    async fn availability_is_ascending_with_times() {
        let (service, _) = service_with_slots(4).await;

        let free = service.query_availability("ST001", "P1").await.unwrap();
        let numbers: Vec<i32> = free.iter().map(|s| s.slot_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(free[0].start_time, "00:00");
        assert_eq!(free[0].end_time, "00:30");
    }

    #[tokio::test]
    async fn conflict_reports_exactly_the_taken_slots() {
        let (service, _) = service_with_slots(16).await;

        service.reserve(command(vec![10, 11])).await.unwrap();

        match service.reserve(command(vec![9, 10])).await {
            Err(DomainError::SlotConflict { conflicting }) => {
                assert_eq!(conflicting, vec![10]);
            }
            other => panic!("expected SlotConflict, got {:?}", other),
        }

        // The losing request must not have claimed its free slot.
        let free = service.query_availability("ST001", "P1").await.unwrap();
        assert!(free.iter().any(|s| s.slot_number == 9));
    }

    #[tokio::test]
    async fn at_most_one_winner_under_concurrency() {
        let (service, _) = service_with_slots(8).await;
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.reserve(command(vec![3, 4])).await
            }));
        }

        let mut winners = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(DomainError::SlotConflict { conflicting }) => {
                    assert!(!conflicting.is_empty());
                    assert!(conflicting.iter().all(|n| [3, 4].contains(n)));
                    conflicts += 1;
                }
                Err(e) => panic!("unexpected error: {:?}", e),
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn unknown_slot_numbers_conflict() {
        let (service, _) = service_with_slots(4).await;

        // Slot 7 was never provisioned, so it is not free.
        match service.reserve(command(vec![4])).await {
            Ok(_) => {}
            Err(e) => panic!("unexpected error: {:?}", e),
        }
        match service.reserve(command(vec![5])).await {
            Err(DomainError::SlotConflict { conflicting }) => assert_eq!(conflicting, vec![5]),
            other => panic!("expected SlotConflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let (service, _) = service_with_slots(8).await;

        let booking = service.reserve(command(vec![5, 6])).await.unwrap();

        service.release(&booking).await.unwrap();
        service.release(&booking).await.unwrap();

        let free = service.query_availability("ST001", "P1").await.unwrap();
        let numbers: Vec<i32> = free.iter().map(|s| s.slot_number).collect();
        assert!(numbers.contains(&5));
        assert!(numbers.contains(&6));
    }

    #[tokio::test]
    async fn guest_quota_blocks_third_booking() {
        let (service, _) = service_with_slots(16).await;
        let guest = Identity::new("guest-9", "Guest User", "0005556666", true);

        for slots in [vec![1], vec![2]] {
            let mut cmd = command(slots);
            cmd.identity = guest.clone();
            service.reserve(cmd).await.unwrap();
        }

        let mut third = command(vec![3]);
        third.identity = guest.clone();
        match service.reserve(third).await {
            Err(DomainError::QuotaExceeded { current, max }) => {
                assert_eq!((current, max), (2, 2));
            }
            other => panic!("expected QuotaExceeded, got {:?}", other),
        }
    }
}
