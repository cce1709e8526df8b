//! Application services

pub mod services;

pub use services::{
    AllocationService, GuestQuotaGate, LifecycleService, ProvisioningService, ReserveCommand,
    SlotAvailability,
};
