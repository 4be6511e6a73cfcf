//! Durable local storage implementations for the salon engine.
//!
//! Provides the filesystem-backed [`DocumentStore`] used in production
//! plus in-memory doubles for tests in other crates.
//!
//! [`DocumentStore`]: salon_core::storage::DocumentStore

pub mod json_store;
pub mod memory_store;
pub mod paths;

pub use json_store::JsonDocumentStore;
pub use memory_store::{FailingDocumentStore, MemoryDocumentStore};
pub use paths::SalonPaths;
