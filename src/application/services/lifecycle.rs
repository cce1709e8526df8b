//! Booking lifecycle transitions
//!
//! Applies confirmed -> completed/cancelled transitions and releases the
//! booking's slots afterwards. Both target states are terminal.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::RepositoryProvider;
use crate::shared::retry::{retry_with_backoff, RetryConfig};
use crate::shared::{DomainError, DomainResult};

pub struct LifecycleService {
    repos: Arc<dyn RepositoryProvider>,
}

impl LifecycleService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Transition a booking to completed or cancelled and free its slots.
    pub async fn update_status(
        &self,
        booking_id: &str,
        new_status: &str,
        reason: Option<String>,
    ) -> DomainResult<Booking> {
        let status = BookingStatus::parse(new_status)
            .filter(BookingStatus::is_terminal)
            .ok_or_else(|| {
                DomainError::Validation(format!(
                    "Invalid status '{}': must be completed or cancelled",
                    new_status
                ))
            })?;

        let mut booking = self
            .repos
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Booking",
                field: "id",
                value: booking_id.to_string(),
            })?;

        if booking.status.is_terminal() {
            return Err(DomainError::Validation(format!(
                "Booking {} is already {}",
                booking.id, booking.status
            )));
        }

        booking.status = status;
        if status == BookingStatus::Cancelled {
            booking.cancellation_reason = reason;
        }
        booking.updated_at = Utc::now();

        self.repos.bookings().update(booking.clone()).await?;

        // Slot release is idempotent, so retrying on a transient storage
        // failure cannot double-free anything.
        let repos = self.repos.clone();
        let b = booking.clone();
        retry_with_backoff(
            RetryConfig::default(),
            || {
                let repos = repos.clone();
                let b = b.clone();
                async move {
                    repos
                        .slots()
                        .release(&b.station_id, &b.point_id, &b.slot_numbers)
                        .await
                }
            },
            |e| e.is_transient(),
            "release_slots",
        )
        .await?;

        metrics::counter!("booking_status_updates_total", "status" => status.as_str())
            .increment(1);
        info!(booking_id = %booking.id, status = %status, "Booking status updated");

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    use crate::application::services::allocation::{AllocationService, ReserveCommand};
    use crate::config::BookingConfig;
    use crate::domain::booking::SlotSelection;
    use crate::domain::slot::Slot;
    use crate::domain::Identity;
    use crate::infrastructure::storage::MemoryRepositoryProvider;

    async fn setup() -> (AllocationService, LifecycleService, Arc<MemoryRepositoryProvider>) {
        let repos = Arc::new(MemoryRepositoryProvider::new());
        let slots = (1..=16).map(|n| Slot::new("ST001", "P1", n, 30)).collect();
        repos.slots().insert_many(slots).await.unwrap();
        (
            AllocationService::new(repos.clone(), &BookingConfig::default()),
            LifecycleService::new(repos.clone()),
            repos,
        )
    }

    fn command(slots: Vec<i32>) -> ReserveCommand {
        ReserveCommand {
            station_id: "ST001".to_string(),
            station_name: "Green Charge Hub".to_string(),
            point_id: "P1".to_string(),
            booking_date: Local::now().date_naive(),
            identity: Identity::new("U001", "Asha", "9990001111", false),
            selection: SlotSelection::from_numbers(slots).unwrap(),
            vehicle_type: "car".to_string(),
            charger_type: "CCS".to_string(),
        }
    }

    #[tokio::test]
    async fn cancel_restores_availability() {
        let (allocation, lifecycle, _) = setup().await;

        let booking = allocation.reserve(command(vec![10, 11])).await.unwrap();
        let free = allocation.query_availability("ST001", "P1").await.unwrap();
        assert!(!free.iter().any(|s| s.slot_number == 10));

        let updated = lifecycle
            .update_status(&booking.id, "cancelled", Some("Change of plans".into()))
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Cancelled);
        assert_eq!(updated.cancellation_reason.as_deref(), Some("Change of plans"));

        let free = allocation.query_availability("ST001", "P1").await.unwrap();
        let numbers: Vec<i32> = free.iter().map(|s| s.slot_number).collect();
        assert!(numbers.contains(&10));
        assert!(numbers.contains(&11));
    }

    #[tokio::test]
    async fn complete_releases_slots() {
        let (allocation, lifecycle, _) = setup().await;

        let booking = allocation.reserve(command(vec![3])).await.unwrap();
        let updated = lifecycle
            .update_status(&booking.id, "completed", None)
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Completed);
        assert!(updated.cancellation_reason.is_none());

        let free = allocation.query_availability("ST001", "P1").await.unwrap();
        assert!(free.iter().any(|s| s.slot_number == 3));
    }

    #[tokio::test]
    async fn terminal_booking_rejects_further_transitions() {
        let (allocation, lifecycle, _) = setup().await;

        let booking = allocation.reserve(command(vec![5])).await.unwrap();
        lifecycle
            .update_status(&booking.id, "completed", None)
            .await
            .unwrap();

        match lifecycle.update_status(&booking.id, "cancelled", None).await {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("already completed")),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let (_, lifecycle, _) = setup().await;

        match lifecycle.update_status("no-such-id", "cancelled", None).await {
            Err(DomainError::NotFound { entity, .. }) => assert_eq!(entity, "Booking"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn invalid_target_status_is_rejected() {
        let (allocation, lifecycle, _) = setup().await;
        let booking = allocation.reserve(command(vec![7])).await.unwrap();

        for status in ["confirmed", "pending", "done"] {
            match lifecycle.update_status(&booking.id, status, None).await {
                Err(DomainError::Validation(_)) => {}
                other => panic!("expected Validation for '{}', got {:?}", status, other),
            }
        }
    }
}
