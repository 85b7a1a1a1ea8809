//! # larder-store
//!
//! Persistent key-value store for Larder (SQLite-backed), plus an in-memory
//! variant for tests and throwaway runs.

pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::Store;
