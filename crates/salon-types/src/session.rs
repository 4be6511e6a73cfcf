//! Saved chat session model.

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// A saved chat transcript as it appears in the history list.
///
/// The `messages` snapshot has oversized inline image payloads stripped
/// before persistence; `date` is an ISO 8601 timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySession {
    pub id: String,
    /// Derived from the first user message, truncated for display.
    pub title: String,
    pub date: String,
    pub messages: Vec<ChatMessage>,
}
