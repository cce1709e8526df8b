//! Slot registry aggregate
//!
//! Contains the Slot entity and its repository interface.

pub mod model;
pub mod repository;

pub use model::{slot_window, Slot};
pub use repository::SlotRepository;
