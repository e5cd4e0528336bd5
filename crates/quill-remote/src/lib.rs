//! # Quill Remote
//!
//! Concrete implementations of the remote-service ports defined in
//! `quill-core`: an HTTP client for the placeholder REST API and an
//! in-memory fake for offline use and tests.
//!
//! ## Feature Flags
//!
//! - `http` (default) - reqwest-backed placeholder API adapter

#[cfg(feature = "http")]
pub mod http;

pub mod memory;

#[cfg(feature = "http")]
pub use http::{ApiClient, HttpPostService, HttpUserService};
pub use memory::{MemoryPostService, MemoryUserService};

#[cfg(test)]
mod tests;
