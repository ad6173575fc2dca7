//! Storage Adapters
//!
//! Implementations of the ByteStore port for persisting the profile stream.
//!
//! ## Available Adapters
//!
//! - **FileByteStore** - One file per key on disk, written atomically
//! - **InMemoryByteStore** - Streams kept in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileByteStore, InMemoryByteStore};
//!
//! // Production: file-based storage
//! let store = FileByteStore::new("./data");
//!
//! // Testing: in-memory storage
//! let store = InMemoryByteStore::new();
//! ```

mod file_byte_store;
mod in_memory_byte_store;

pub use file_byte_store::FileByteStore;
pub use in_memory_byte_store::InMemoryByteStore;
