//! Chat transcript message types.

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI consultant.
    Assistant,
}

/// A structured recommendation carousel attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBlock {
    pub title: String,
    pub products: Vec<Product>,
}

/// One transcript entry.
///
/// A message carrying neither `content` nor any media is semantically empty
/// but valid; consumers must handle it gracefully rather than reject it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Data-URL or remote URL of an image the user attached.
    #[serde(default)]
    pub image: Option<String>,
    /// Try-on/visualization result; always a URL, never an inline payload.
    #[serde(default)]
    pub simulation_image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<RecommendationBlock>,
}

impl ChatMessage {
    /// Creates a text-only message.
    pub fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            image: None,
            simulation_image: None,
            blocks: Vec::new(),
        }
    }

    /// Returns true if the message has non-empty text content.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// Response of the consultant chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub simulation_image: Option<String>,
}
