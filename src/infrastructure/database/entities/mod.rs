//! SeaORM entities

pub mod booking;
pub mod slot;
