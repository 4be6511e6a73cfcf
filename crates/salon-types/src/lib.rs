//! Shared domain models for the salon client engine.
//!
//! These are the "pure" types the store and client crates operate on.
//! They are independent of any transport or storage format.

pub mod message;
pub mod product;
pub mod profile;
pub mod project;
pub mod session;

pub use message::{ChatMessage, ChatReply, MessageRole, RecommendationBlock};
pub use product::{CurrencyRate, Facet, Product, ProductPage};
pub use profile::UserProfile;
pub use project::Project;
pub use session::HistorySession;
