//! Persistent key-value boundary consumed by the session layer.
//!
//! The host platform supplies the real store (device preferences, browser
//! storage, a file). This module only defines the contract and an in-memory
//! implementation used by tests.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryKeyValueStore;
pub use traits::KeyValueStore;
