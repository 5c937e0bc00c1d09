//! Storage adapters binding the CRUD contract to concrete backends

#[cfg(feature = "in-memory")]
pub mod memory;

#[cfg(feature = "in-memory")]
pub use memory::MemoryRepository;
