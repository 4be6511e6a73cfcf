//! Chat session and history store.
//!
//! Manages the live transcript plus a bounded list of named past sessions.
//! Saving is size-aware: oversized inline image payloads are stripped from
//! the snapshot before it reaches the durable store. Every transition that
//! changes the active session saves the outgoing transcript first, so an
//! in-progress conversation is never silently lost.

use std::sync::Arc;

use tokio::sync::RwLock;

use salon_types::{ChatMessage, HistorySession, MessageRole};

use crate::storage::{load_json, save_json, DocumentStore, CHAT_HISTORY_DOC};

/// Most-recent sessions kept in history; older ones are evicted.
pub const HISTORY_LIMIT: usize = 20;

/// Session titles are cut to this many characters of the first user message.
pub const TITLE_LIMIT: usize = 30;

/// Inline (`data:`) image payloads longer than this are dropped from
/// persisted snapshots. URL images are kept regardless of length.
pub const INLINE_IMAGE_LIMIT: usize = 1000;

/// Opening assistant message of a fresh transcript.
pub const DEFAULT_GREETING: &str =
    "Hi! I'm your design consultant. Ask me anything or upload a photo to search the catalog.";

/// Manages the live chat transcript and the saved-session list.
pub struct ChatSessionStore {
    messages: RwLock<Vec<ChatMessage>>,
    history: RwLock<Vec<HistorySession>>,
    current_id: RwLock<Option<String>>,
    store: Arc<dyn DocumentStore>,
    greeting: String,
}

impl ChatSessionStore {
    /// Creates a store with a fresh greeting transcript and empty history.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_greeting(store, DEFAULT_GREETING)
    }

    /// Creates a store with a custom greeting message.
    pub fn with_greeting(store: Arc<dyn DocumentStore>, greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            messages: RwLock::new(vec![ChatMessage::text(MessageRole::Assistant, &greeting)]),
            history: RwLock::new(Vec::new()),
            current_id: RwLock::new(None),
            store,
            greeting,
        }
    }

    /// Restores the saved-session list from the durable store.
    ///
    /// A missing or unreadable document leaves the history empty; the
    /// failure is logged, never propagated.
    pub async fn load(&self) {
        match load_json::<Vec<HistorySession>>(self.store.as_ref(), CHAT_HISTORY_DOC).await {
            Ok(Some(sessions)) => *self.history.write().await = sessions,
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "failed to load chat history");
            }
        }
    }

    /// Appends to the live transcript without persisting.
    pub async fn append_message(&self, message: ChatMessage) {
        self.messages.write().await.push(message);
    }

    /// Returns a clone of the live transcript.
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    /// Returns a clone of the saved-session list (most recent first).
    pub async fn history(&self) -> Vec<HistorySession> {
        self.history.read().await.clone()
    }

    /// Returns the id of the active session, if it has been saved before.
    pub async fn current_session_id(&self) -> Option<String> {
        self.current_id.read().await.clone()
    }

    /// Snapshots the live transcript into the history list and persists it.
    ///
    /// No-ops unless the transcript's first user message carries content,
    /// so greeting-only sessions are never saved. An existing session with
    /// the same id is replaced; the list is capped at [`HISTORY_LIMIT`].
    pub async fn save_current_session(&self) {
        let messages = self.messages.read().await.clone();

        let first_user = messages.iter().find(|m| m.role == MessageRole::User);
        let Some(title_source) = first_user.filter(|m| m.has_content()) else {
            return;
        };
        let title = truncate_title(title_source.content.as_deref().unwrap_or_default());

        let id = {
            let mut current = self.current_id.write().await;
            match current.as_ref() {
                Some(id) => id.clone(),
                None => {
                    let history = self.history.read().await;
                    let id = fresh_session_id(&history);
                    *current = Some(id.clone());
                    id
                }
            }
        };

        let session = HistorySession {
            id: id.clone(),
            title,
            date: chrono::Utc::now().to_rfc3339(),
            messages: messages.into_iter().map(strip_inline_image).collect(),
        };

        let snapshot = {
            let mut history = self.history.write().await;
            history.retain(|s| s.id != id);
            history.insert(0, session);
            history.truncate(HISTORY_LIMIT);
            history.clone()
        };

        if let Err(err) = save_json(self.store.as_ref(), CHAT_HISTORY_DOC, &snapshot).await {
            tracing::warn!(error = %err, "failed to persist chat history");
        }
    }

    /// Saves the current session, then resets to a fresh greeting transcript.
    pub async fn start_new_session(&self) {
        self.save_current_session().await;
        self.reset_transcript().await;
    }

    /// Saves the current session, then loads the target session's
    /// transcript and adopts its id. Unknown ids are ignored.
    pub async fn switch_to_session(&self, id: &str) {
        self.save_current_session().await;

        let target = {
            let history = self.history.read().await;
            history.iter().find(|s| s.id == id).cloned()
        };
        match target {
            Some(session) => {
                *self.messages.write().await = session.messages;
                *self.current_id.write().await = Some(session.id);
            }
            None => {
                tracing::debug!(id, "switch requested for unknown session");
            }
        }
    }

    /// Removes a session from history and persists the shortened list.
    ///
    /// Deleting the active session resets the transcript to the greeting
    /// without re-saving it; saving here would resurrect what the user
    /// just deleted.
    pub async fn delete_session(&self, id: &str) {
        let snapshot = {
            let mut history = self.history.write().await;
            history.retain(|s| s.id != id);
            history.clone()
        };

        if let Err(err) = save_json(self.store.as_ref(), CHAT_HISTORY_DOC, &snapshot).await {
            tracing::warn!(error = %err, "failed to persist chat history after deletion");
        }

        let was_active = self.current_id.read().await.as_deref() == Some(id);
        if was_active {
            self.reset_transcript().await;
        }
    }

    async fn reset_transcript(&self) {
        *self.messages.write().await =
            vec![ChatMessage::text(MessageRole::Assistant, &self.greeting)];
        *self.current_id.write().await = None;
    }
}

/// First [`TITLE_LIMIT`] characters of the message, with an ellipsis when cut.
fn truncate_title(content: &str) -> String {
    if content.chars().count() > TITLE_LIMIT {
        let cut: String = content.chars().take(TITLE_LIMIT).collect();
        format!("{cut}...")
    } else {
        content.to_string()
    }
}

/// Drops oversized inline image payloads from a snapshot message.
///
/// `simulation_image` is always a URL and is preserved unconditionally.
fn strip_inline_image(mut message: ChatMessage) -> ChatMessage {
    if let Some(image) = &message.image {
        if image.starts_with("data:") && image.len() > INLINE_IMAGE_LIMIT {
            message.image = None;
        }
    }
    message
}

/// Millisecond-timestamp id, bumped past any existing session on collision.
fn fresh_session_id(history: &[HistorySession]) -> String {
    let mut candidate = chrono::Utc::now().timestamp_millis();
    while history.iter().any(|s| s.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::error::{Result, SalonError};

    #[derive(Default)]
    struct TestStore {
        docs: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl DocumentStore for TestStore {
        async fn read(&self, key: &str) -> Result<Option<String>> {
            Ok(self.docs.lock().unwrap().get(key).cloned())
        }

        async fn write(&self, key: &str, value: &str) -> Result<()> {
            self.docs
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn read(&self, _key: &str) -> Result<Option<String>> {
            Err(SalonError::storage("quota exceeded"))
        }

        async fn write(&self, _key: &str, _value: &str) -> Result<()> {
            Err(SalonError::storage("quota exceeded"))
        }
    }

    fn user(content: &str) -> ChatMessage {
        ChatMessage::text(MessageRole::User, content)
    }

    #[tokio::test]
    async fn test_save_without_user_message_is_noop() {
        let store = ChatSessionStore::new(Arc::new(TestStore::default()));

        store.save_current_session().await;

        assert!(store.history().await.is_empty());
        assert!(store.current_session_id().await.is_none());
    }

    #[tokio::test]
    async fn test_save_requires_content_on_first_user_message() {
        let store = ChatSessionStore::new(Arc::new(TestStore::default()));
        // First user message is image-only; a later one has text. The
        // title source is the first user message, so nothing is saved.
        let mut image_only = ChatMessage::text(MessageRole::User, "");
        image_only.content = None;
        image_only.image = Some("https://cdn.example/photo.jpg".to_string());
        store.append_message(image_only).await;
        store.append_message(user("now with text")).await;

        store.save_current_session().await;

        assert!(store.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_title_truncation() {
        let store = ChatSessionStore::new(Arc::new(TestStore::default()));
        store.append_message(user(&"x".repeat(45))).await;
        store.save_current_session().await;

        let history = store.history().await;
        assert_eq!(history[0].title.chars().count(), TITLE_LIMIT + 3);
        assert!(history[0].title.ends_with("..."));

        let store = ChatSessionStore::new(Arc::new(TestStore::default()));
        store.append_message(user(&"y".repeat(20))).await;
        store.save_current_session().await;

        assert_eq!(store.history().await[0].title, "y".repeat(20));
    }

    #[tokio::test]
    async fn test_oversized_inline_image_is_stripped() {
        let store = ChatSessionStore::new(Arc::new(TestStore::default()));

        let mut big = user("look at this");
        big.image = Some(format!("data:{}", "a".repeat(4995)));
        let mut small = ChatMessage::text(MessageRole::User, "and this");
        small.image = Some(format!("data:{}", "b".repeat(495)));
        let mut linked = ChatMessage::text(MessageRole::Assistant, "rendered");
        linked.image = Some(format!("https://cdn.example/{}", "c".repeat(2000)));
        linked.simulation_image = Some(format!("https://cdn.example/sim/{}", "d".repeat(2000)));

        store.append_message(big).await;
        store.append_message(small).await;
        store.append_message(linked).await;
        store.save_current_session().await;

        let saved = &store.history().await[0].messages;
        // Index 0 is the greeting.
        assert_eq!(saved[1].image, None);
        assert!(saved[2].image.as_ref().unwrap().starts_with("data:"));
        assert!(saved[3].image.as_ref().unwrap().starts_with("https://"));
        assert!(saved[3].simulation_image.is_some());
    }

    #[tokio::test]
    async fn test_history_is_capped_at_limit() {
        let store = ChatSessionStore::new(Arc::new(TestStore::default()));

        for i in 0..25 {
            store.append_message(user(&format!("question {i}"))).await;
            store.start_new_session().await;
        }

        let history = store.history().await;
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].title, "question 24");
        assert_eq!(history[HISTORY_LIMIT - 1].title, "question 5");
    }

    #[tokio::test]
    async fn test_resave_replaces_same_session() {
        let store = ChatSessionStore::new(Arc::new(TestStore::default()));
        store.append_message(user("first question")).await;
        store.save_current_session().await;
        let id = store.current_session_id().await.unwrap();

        store.append_message(user("follow-up")).await;
        store.save_current_session().await;

        let history = store.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, id);
        assert_eq!(history[0].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_switch_saves_outgoing_session() {
        let store = ChatSessionStore::new(Arc::new(TestStore::default()));
        store.append_message(user("about chairs")).await;
        store.start_new_session().await;
        let chairs_id = store.history().await[0].id.clone();

        store.append_message(user("about tables")).await;
        store.switch_to_session(&chairs_id).await;

        // The outgoing "tables" conversation was saved before the switch.
        let history = store.history().await;
        assert!(history.iter().any(|s| s.title == "about tables"));

        // The live transcript is now the chairs session.
        let transcript = store.transcript().await;
        assert!(transcript.iter().any(|m| m.content.as_deref() == Some("about chairs")));
        assert_eq!(store.current_session_id().await, Some(chairs_id));
    }

    #[tokio::test]
    async fn test_delete_active_session_resets_transcript() {
        let store = ChatSessionStore::new(Arc::new(TestStore::default()));
        store.append_message(user("to be deleted")).await;
        store.save_current_session().await;
        let id = store.current_session_id().await.unwrap();

        store.delete_session(&id).await;

        assert!(store.history().await.is_empty());
        assert!(store.current_session_id().await.is_none());
        let transcript = store.transcript().await;
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_delete_other_session_keeps_transcript() {
        let store = ChatSessionStore::new(Arc::new(TestStore::default()));
        store.append_message(user("keep me")).await;
        store.start_new_session().await;
        let old_id = store.history().await[0].id.clone();

        store.append_message(user("active chat")).await;
        store.delete_session(&old_id).await;

        let transcript = store.transcript().await;
        assert!(transcript.iter().any(|m| m.content.as_deref() == Some("active chat")));
    }

    #[tokio::test]
    async fn test_persistence_failure_is_swallowed() {
        let store = ChatSessionStore::new(Arc::new(FailingStore));
        store.append_message(user("quota test")).await;

        store.save_current_session().await;

        // History is updated in memory even though the write failed.
        assert_eq!(store.history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_load_restores_persisted_history() {
        let backing = Arc::new(TestStore::default());

        let store = ChatSessionStore::new(backing.clone());
        store.append_message(user("persisted question")).await;
        store.save_current_session().await;

        let restored = ChatSessionStore::new(backing);
        restored.load().await;

        let history = restored.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].title, "persisted question");
    }
}
