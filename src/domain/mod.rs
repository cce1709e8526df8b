//! Core business entities, types and repository traits

pub mod allocation;
pub mod booking;
pub mod identity;
pub mod slot;

pub use allocation::AllocationStore;
pub use booking::{Booking, BookingRepository, BookingStatus, SlotSelection};
pub use identity::Identity;
pub use slot::{Slot, SlotRepository};

pub use crate::shared::{DomainError, DomainResult};

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let free = repos.slots().find_free("ST001", "P1").await?;
///     let booking = repos.bookings().find_by_id(&id).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn slots(&self) -> &dyn SlotRepository;
    fn bookings(&self) -> &dyn BookingRepository;
    fn allocations(&self) -> &dyn AllocationStore;
}
