//! SeaORM repository implementations

pub mod allocation_store;
pub mod booking_repository;
pub mod repository_provider;
pub mod slot_repository;

pub use allocation_store::SeaOrmAllocationStore;
pub use booking_repository::SeaOrmBookingRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use slot_repository::SeaOrmSlotRepository;
