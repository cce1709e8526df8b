//! Alternative storage backends

pub mod memory;

pub use memory::{MemoryRepositoryProvider, MemoryStore};
