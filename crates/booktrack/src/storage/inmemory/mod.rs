//! Volatile in-memory storage backend for local development and tests.

mod backend;

pub use backend::MemoryBackend;
