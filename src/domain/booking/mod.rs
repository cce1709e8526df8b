//! Booking ledger aggregate
//!
//! Contains the Booking entity, the status state machine, the slot-set
//! normalization type and the repository interface.

pub mod model;
pub mod repository;
pub mod selection;

pub use model::{Booking, BookingStatus};
pub use repository::BookingRepository;
pub use selection::{SlotSelection, MAX_SLOTS_PER_BOOKING};
