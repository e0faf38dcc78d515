//! Durable key-value storage port and the in-memory binding

pub mod memory;
pub mod ports;

pub use memory::MemoryStore;
pub use ports::KeyValueStore;
