//! # Quill Core
//!
//! The domain layer of the quill post store: entities, error taxonomy,
//! remote-service ports, the normalized post collection, and the optional
//! tag-based cache decorator. This crate contains pure logic with no HTTP
//! or storage dependencies.

pub mod cache;
pub mod domain;
pub mod error;
pub mod ports;
pub mod store;

pub use cache::CachedPostStore;
pub use error::{RemoteError, StoreError};
pub use store::{LoadStatus, MergePolicy, PostStore, UserDirectory};
