//! Chat transcript and bounded session history.

pub mod session;

pub use session::{
    ChatSessionStore, DEFAULT_GREETING, HISTORY_LIMIT, INLINE_IMAGE_LIMIT, TITLE_LIMIT,
};
