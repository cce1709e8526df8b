//! Daily occupancy reset
//!
//! Slot occupancy is single-day state. At local midnight every confirmed
//! booking from the day that just ended is cancelled as a no-show and all
//! slots are returned to the free pool for the new day.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tracing::{error, info};

use crate::domain::RepositoryProvider;
use crate::shared::ShutdownSignal;

pub const NO_SHOW_REASON: &str = "No-show at station (auto-cancelled)";

/// Spawn the background task that runs the reset at each local midnight.
pub fn start_daily_reset_task(
    repos: Arc<dyn RepositoryProvider>,
    shutdown: ShutdownSignal,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!("Daily reset task started");
        loop {
            let sleep_for = duration_until_local_midnight();
            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {
                    // The day that just ended is "yesterday" once midnight passes.
                    let day_ended = Local::now()
                        .date_naive()
                        .pred_opt()
                        .unwrap_or_else(|| Local::now().date_naive());
                    run_daily_reset(repos.as_ref(), day_ended).await;
                }
                _ = shutdown.wait() => {
                    info!("Daily reset task stopping");
                    return;
                }
            }
        }
    })
}

/// Cancel leftover confirmed bookings for `day_ended` and free every slot.
///
/// Errors are logged, not propagated: a failed sweep must not take the
/// service down, and the next midnight run retries naturally.
pub async fn run_daily_reset(repos: &dyn RepositoryProvider, day_ended: NaiveDate) {
    match repos
        .bookings()
        .cancel_confirmed_on(day_ended, NO_SHOW_REASON)
        .await
    {
        Ok(cancelled) => {
            if cancelled > 0 {
                info!(date = %day_ended, cancelled, "Auto-cancelled no-show bookings");
            }
            metrics::counter!("daily_reset_cancellations_total").increment(cancelled);
        }
        Err(e) => error!(date = %day_ended, error = %e, "Daily reset: cancelling no-shows failed"),
    }

    match repos.slots().release_all().await {
        Ok(freed) => info!(date = %day_ended, freed, "Daily reset: slot pool cleared"),
        Err(e) => error!(date = %day_ended, error = %e, "Daily reset: slot release failed"),
    }
}

fn duration_until_local_midnight() -> Duration {
    let now = Local::now();
    let next_midnight = now
        .date_naive()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|t| t.and_local_timezone(Local).earliest());
    match next_midnight {
        Some(midnight) => (midnight - now)
            .to_std()
            .unwrap_or(Duration::from_secs(60)),
        None => Duration::from_secs(60 * 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::booking::{Booking, BookingStatus, SlotSelection};
    use crate::domain::slot::Slot;
    use crate::domain::Identity;
    use crate::infrastructure::storage::MemoryRepositoryProvider;

    #[tokio::test]
    async fn reset_cancels_no_shows_and_frees_slots() {
        let repos = Arc::new(MemoryRepositoryProvider::new());
        let slots = (1..=8).map(|n| Slot::new("ST001", "P1", n, 30)).collect();
        repos.slots().insert_many(slots).await.unwrap();

        let yesterday = Local::now().date_naive().pred_opt().unwrap();
        let identity = Identity::new("U001", "Asha", "9990001111", false);
        let selection = SlotSelection::from_numbers(vec![2, 3]).unwrap();
        let booking = Booking::new(
            "ST001",
            "Green Charge Hub",
            "P1",
            &identity,
            &selection,
            yesterday,
            "car",
            "CCS",
            30,
        );
        let booking = repos.allocations().reserve(booking).await.unwrap();

        run_daily_reset(repos.as_ref(), yesterday).await;

        let swept = repos
            .bookings()
            .find_by_id(&booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(swept.status, BookingStatus::Cancelled);
        assert_eq!(swept.cancellation_reason.as_deref(), Some(NO_SHOW_REASON));

        let free = repos.slots().find_free("ST001", "P1").await.unwrap();
        assert_eq!(free.len(), 8);
    }

    #[tokio::test]
    async fn reset_leaves_terminal_bookings_alone() {
        let repos = Arc::new(MemoryRepositoryProvider::new());
        let slots = (1..=4).map(|n| Slot::new("ST001", "P1", n, 30)).collect();
        repos.slots().insert_many(slots).await.unwrap();

        let yesterday = Local::now().date_naive().pred_opt().unwrap();
        let identity = Identity::new("U001", "Asha", "9990001111", false);
        let selection = SlotSelection::from_numbers(vec![1]).unwrap();
        let mut booking = Booking::new(
            "ST001",
            "Green Charge Hub",
            "P1",
            &identity,
            &selection,
            yesterday,
            "car",
            "CCS",
            30,
        );
        booking = repos.allocations().reserve(booking).await.unwrap();
        booking.status = BookingStatus::Completed;
        repos.bookings().update(booking.clone()).await.unwrap();

        run_daily_reset(repos.as_ref(), yesterday).await;

        let after = repos
            .bookings()
            .find_by_id(&booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.status, BookingStatus::Completed);
        assert!(after.cancellation_reason.is_none());
    }

    #[test]
    fn midnight_is_at_most_a_day_away() {
        let d = duration_until_local_midnight();
        assert!(d <= Duration::from_secs(24 * 60 * 60));
    }
}
