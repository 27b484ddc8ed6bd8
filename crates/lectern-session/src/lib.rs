//! Session store: single source of truth for the active conversation.

pub mod store;

pub use store::{derive_title, SessionStore, TITLE_MAX_CHARS};
