//! Slot inventory provisioning
//!
//! Generates the fixed half-hour slot grid for a charging point. Provisioning
//! is one-shot per point; re-provisioning an existing inventory is a conflict.

use std::sync::Arc;

use tracing::info;

use crate::config::BookingConfig;
use crate::domain::slot::Slot;
use crate::domain::RepositoryProvider;
use crate::shared::{DomainError, DomainResult};

pub struct ProvisioningService {
    repos: Arc<dyn RepositoryProvider>,
    slots_per_point: u32,
    slot_minutes: u32,
}

impl ProvisioningService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, config: &BookingConfig) -> Self {
        Self {
            repos,
            slots_per_point: config.slots_per_point,
            slot_minutes: config.slot_minutes,
        }
    }

    /// Create the full slot grid for a point. Returns how many slots were
    /// created.
    pub async fn provision_point(&self, station_id: &str, point_id: &str) -> DomainResult<u32> {
        let existing = self
            .repos
            .slots()
            .count_for_point(station_id, point_id)
            .await?;
        if existing > 0 {
            return Err(DomainError::Conflict(format!(
                "Point {}/{} already has {} slots",
                station_id, point_id, existing
            )));
        }

        let slots: Vec<Slot> = (1..=self.slots_per_point as i32)
            .map(|n| Slot::new(station_id, point_id, n, self.slot_minutes))
            .collect();
        self.repos.slots().insert_many(slots).await?;

        info!(
            station = %station_id,
            point = %point_id,
            count = self.slots_per_point,
            "Provisioned slot inventory"
        );
        Ok(self.slots_per_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::infrastructure::storage::MemoryRepositoryProvider;

    fn service(repos: Arc<MemoryRepositoryProvider>) -> ProvisioningService {
        ProvisioningService::new(repos, &BookingConfig::default())
    }

    #[tokio::test]
    async fn provisions_full_grid_once() {
        let repos = Arc::new(MemoryRepositoryProvider::new());
        let created = service(repos.clone())
            .provision_point("ST001", "P1")
            .await
            .unwrap();
        assert_eq!(created, 48);

        let free = repos.slots().find_free("ST001", "P1").await.unwrap();
        assert_eq!(free.len(), 48);
        assert_eq!(free[0].slot_number, 1);
        assert_eq!(free[0].start_time, "00:00");
        assert_eq!(free[47].slot_number, 48);
        assert_eq!(free[47].start_time, "23:30");
    }

    #[tokio::test]
    async fn reprovisioning_conflicts() {
        let repos = Arc::new(MemoryRepositoryProvider::new());
        let svc = service(repos.clone());
        svc.provision_point("ST001", "P1").await.unwrap();

        match svc.provision_point("ST001", "P1").await {
            Err(DomainError::Conflict(msg)) => assert!(msg.contains("already has 48")),
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn points_are_provisioned_independently() {
        let repos = Arc::new(MemoryRepositoryProvider::new());
        let svc = service(repos.clone());
        svc.provision_point("ST001", "P1").await.unwrap();
        svc.provision_point("ST001", "P2").await.unwrap();

        assert_eq!(repos.slots().count_for_point("ST001", "P1").await.unwrap(), 48);
        assert_eq!(repos.slots().count_for_point("ST001", "P2").await.unwrap(), 48);
    }
}
