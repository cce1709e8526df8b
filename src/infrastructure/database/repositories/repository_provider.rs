//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::allocation::AllocationStore;
use crate::domain::booking::BookingRepository;
use crate::domain::slot::SlotRepository;
use crate::domain::RepositoryProvider;

use super::allocation_store::SeaOrmAllocationStore;
use super::booking_repository::SeaOrmBookingRepository;
use super::slot_repository::SeaOrmSlotRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let free = repos.slots().find_free("ST001", "P1").await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    slots: SeaOrmSlotRepository,
    bookings: SeaOrmBookingRepository,
    allocations: SeaOrmAllocationStore,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            slots: SeaOrmSlotRepository::new(db.clone()),
            bookings: SeaOrmBookingRepository::new(db.clone()),
            allocations: SeaOrmAllocationStore::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn slots(&self) -> &dyn SlotRepository {
        &self.slots
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn allocations(&self) -> &dyn AllocationStore {
        &self.allocations
    }
}
