//! Guest booking quota gate
//!
//! Policy filter in front of the allocation engine: guest identities are
//! limited to a bounded number of bookings per local calendar day. The gate
//! fails open - if the count cannot be computed, the booking is allowed
//! rather than blocked.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tracing::warn;

use crate::domain::{Identity, RepositoryProvider};
use crate::shared::{DomainError, DomainResult};

pub struct GuestQuotaGate {
    repos: Arc<dyn RepositoryProvider>,
    max_per_day: u64,
}

impl GuestQuotaGate {
    pub fn new(repos: Arc<dyn RepositoryProvider>, max_per_day: u64) -> Self {
        Self { repos, max_per_day }
    }

    /// Check whether `identity` may place another booking today.
    pub async fn check(&self, identity: &Identity) -> DomainResult<()> {
        if !identity.is_guest {
            return Ok(());
        }

        match self
            .repos
            .bookings()
            .count_for_user_since(&identity.user_id, start_of_local_day())
            .await
        {
            Ok(current) if current >= self.max_per_day => Err(DomainError::QuotaExceeded {
                current,
                max: self.max_per_day,
            }),
            Ok(_) => Ok(()),
            Err(e) => {
                // Fail open: a broken count must not block bookings.
                warn!(error = %e, user_id = %identity.user_id, "Guest quota check failed, allowing booking");
                Ok(())
            }
        }
    }

    /// Today's booking count for a guest identity (0 for non-guests and on
    /// count failure, mirroring the fail-open policy).
    pub async fn count_today(&self, identity: &Identity) -> u64 {
        if !identity.is_guest {
            return 0;
        }
        self.repos
            .bookings()
            .count_for_user_since(&identity.user_id, start_of_local_day())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Guest booking count failed");
                0
            })
    }

    pub fn max_per_day(&self) -> u64 {
        self.max_per_day
    }
}

/// Local midnight of the current day, in UTC.
pub(crate) fn start_of_local_day() -> DateTime<Utc> {
    Local::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|t| t.and_local_timezone(Local).earliest())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::domain::allocation::AllocationStore;
    use crate::domain::booking::{Booking, BookingRepository, BookingStatus, SlotSelection};
    use crate::domain::slot::{Slot, SlotRepository};
    use crate::infrastructure::storage::MemoryRepositoryProvider;

    fn guest() -> Identity {
        Identity::new("guest-1", "Guest User", "0001112222", true)
    }

    fn member() -> Identity {
        Identity::new("U100", "Ravi", "0003334444", false)
    }

    fn booking_for(identity: &Identity, slots: Vec<i32>) -> Booking {
        let selection = SlotSelection::from_numbers(slots).unwrap();
        Booking::new(
            "ST001",
            "Green Charge Hub",
            "P1",
            identity,
            &selection,
            Local::now().date_naive(),
            "car",
            "CCS",
            30,
        )
    }

    async fn provider_with_slots() -> Arc<MemoryRepositoryProvider> {
        let repos = Arc::new(MemoryRepositoryProvider::new());
        let slots = (1..=12).map(|n| Slot::new("ST001", "P1", n, 30)).collect();
        repos.slots().insert_many(slots).await.unwrap();
        repos
    }

    #[tokio::test]
    async fn guest_under_limit_is_allowed() {
        let repos = provider_with_slots().await;
        let gate = GuestQuotaGate::new(repos.clone(), 2);

        repos
            .allocations()
            .reserve(booking_for(&guest(), vec![1]))
            .await
            .unwrap();

        assert!(gate.check(&guest()).await.is_ok());
        assert_eq!(gate.count_today(&guest()).await, 1);
    }

    #[tokio::test]
    async fn guest_at_limit_is_rejected_with_counts() {
        let repos = provider_with_slots().await;
        let gate = GuestQuotaGate::new(repos.clone(), 2);

        repos
            .allocations()
            .reserve(booking_for(&guest(), vec![1]))
            .await
            .unwrap();
        repos
            .allocations()
            .reserve(booking_for(&guest(), vec![2]))
            .await
            .unwrap();

        match gate.check(&guest()).await {
            Err(DomainError::QuotaExceeded { current, max }) => {
                assert_eq!(current, 2);
                assert_eq!(max, 2);
            }
            other => panic!("expected QuotaExceeded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_guest_is_never_limited() {
        let repos = provider_with_slots().await;
        let gate = GuestQuotaGate::new(repos.clone(), 2);

        for n in 1..=5 {
            repos
                .allocations()
                .reserve(booking_for(&member(), vec![n]))
                .await
                .unwrap();
        }

        assert!(gate.check(&member()).await.is_ok());
        assert_eq!(gate.count_today(&member()).await, 0);
    }

    // ── fail-open behavior ──────────────────────────────────────

    struct FailingStore;

    #[async_trait]
    impl SlotRepository for FailingStore {
        async fn insert_many(&self, _: Vec<Slot>) -> DomainResult<()> {
            Err(DomainError::Storage("down".into()))
        }
        async fn count_for_point(&self, _: &str, _: &str) -> DomainResult<u64> {
            Err(DomainError::Storage("down".into()))
        }
        async fn find_free(&self, _: &str, _: &str) -> DomainResult<Vec<Slot>> {
            Err(DomainError::Storage("down".into()))
        }
        async fn find_free_numbers(&self, _: &str, _: &str, _: &[i32]) -> DomainResult<Vec<i32>> {
            Err(DomainError::Storage("down".into()))
        }
        async fn release(&self, _: &str, _: &str, _: &[i32]) -> DomainResult<u64> {
            Err(DomainError::Storage("down".into()))
        }
        async fn release_all(&self) -> DomainResult<u64> {
            Err(DomainError::Storage("down".into()))
        }
    }

    #[async_trait]
    impl BookingRepository for FailingStore {
        async fn find_by_id(&self, _: &str) -> DomainResult<Option<Booking>> {
            Err(DomainError::Storage("down".into()))
        }
        async fn update(&self, _: Booking) -> DomainResult<()> {
            Err(DomainError::Storage("down".into()))
        }
        async fn find_by_user_phone(&self, _: &str) -> DomainResult<Vec<Booking>> {
            Err(DomainError::Storage("down".into()))
        }
        async fn find_active_by_user_phone(&self, _: &str) -> DomainResult<Vec<Booking>> {
            Err(DomainError::Storage("down".into()))
        }
        async fn find_for_station(
            &self,
            _: &str,
            _: Option<NaiveDate>,
            _: Option<BookingStatus>,
        ) -> DomainResult<Vec<Booking>> {
            Err(DomainError::Storage("down".into()))
        }
        async fn count_for_user_since(&self, _: &str, _: DateTime<Utc>) -> DomainResult<u64> {
            Err(DomainError::Storage("down".into()))
        }
        async fn cancel_confirmed_on(&self, _: NaiveDate, _: &str) -> DomainResult<u64> {
            Err(DomainError::Storage("down".into()))
        }
    }

    #[async_trait]
    impl AllocationStore for FailingStore {
        async fn reserve(&self, _: Booking) -> DomainResult<Booking> {
            Err(DomainError::Storage("down".into()))
        }
    }

    impl RepositoryProvider for FailingStore {
        fn slots(&self) -> &dyn SlotRepository {
            self
        }
        fn bookings(&self) -> &dyn BookingRepository {
            self
        }
        fn allocations(&self) -> &dyn AllocationStore {
            self
        }
    }

    #[tokio::test]
    async fn count_failure_fails_open() {
        let gate = GuestQuotaGate::new(Arc::new(FailingStore), 2);
        assert!(gate.check(&guest()).await.is_ok());
        assert_eq!(gate.count_today(&guest()).await, 0);
    }
}
