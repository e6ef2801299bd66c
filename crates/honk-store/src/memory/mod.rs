//! In-memory collaborative store

mod memory_store;

pub use memory_store::MemoryStore;
