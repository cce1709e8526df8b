//! Slot registry repository interface

use async_trait::async_trait;

use super::model::Slot;
use crate::shared::DomainResult;

#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Insert pre-generated slot inventory for a point
    async fn insert_many(&self, slots: Vec<Slot>) -> DomainResult<()>;

    /// Number of slots provisioned for a point (0 = not provisioned)
    async fn count_for_point(&self, station_id: &str, point_id: &str) -> DomainResult<u64>;

    /// Free slots for a point, ascending by slot number
    async fn find_free(&self, station_id: &str, point_id: &str) -> DomainResult<Vec<Slot>>;

    /// Free slot numbers among `numbers` for a point, ascending.
    ///
    /// Read-only pre-check; the authoritative occupancy check happens
    /// inside `AllocationStore::reserve`.
    async fn find_free_numbers(
        &self,
        station_id: &str,
        point_id: &str,
        numbers: &[i32],
    ) -> DomainResult<Vec<i32>>;

    /// Mark the given slots free. Idempotent: releasing an already-free
    /// slot is a no-op. Returns the number of rows touched.
    async fn release(
        &self,
        station_id: &str,
        point_id: &str,
        numbers: &[i32],
    ) -> DomainResult<u64>;

    /// Mark every occupied slot free (daily reset). Returns the count released.
    async fn release_all(&self) -> DomainResult<u64>;
}
