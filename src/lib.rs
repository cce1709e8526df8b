//!
//! Slot booking service for EV charging stations.
//!
//! Charging points carry a fixed grid of half-hour slots; bookings claim
//! 1-4 contiguous slots atomically, with exactly one winner under
//! concurrent requests for the same slots.

pub mod api;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use api::{create_api_router, AppState};
pub use config::{default_config_path, AppConfig};
pub use infrastructure::database::{init_database, DatabaseConfig};
pub use infrastructure::database::repositories::SeaOrmRepositoryProvider;
pub use shared::{DomainError, DomainResult, ShutdownSignal};
