pub mod catalog;
pub mod chat;
pub mod debounce;
pub mod error;
pub mod project;
pub mod storage;

// Re-export common error type
pub use error::{Result, SalonError};
