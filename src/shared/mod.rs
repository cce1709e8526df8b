//! Cross-cutting concerns shared by all layers

pub mod errors;
pub mod retry;
pub mod shutdown;

pub use errors::{DomainError, DomainResult};
pub use shutdown::ShutdownSignal;
