//! TTL cache of provider resource collections

pub mod service;

pub use service::ResourceCache;
