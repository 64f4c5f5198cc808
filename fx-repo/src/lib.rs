//! # FX Repository
//!
//! Repository adapters for the FX service. The service keeps no state outside
//! the process, so the only adapter is the in-memory store.

pub mod memory;

pub use memory::InMemoryRepo;

/// Build an empty repository.
pub fn build_repo() -> InMemoryRepo {
    InMemoryRepo::new()
}
