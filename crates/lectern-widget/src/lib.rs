//! Thin consumer shell over the orchestration core: the chat-window
//! lifecycle coordinator and the page-level assistant that wires selection
//! capture to it.

pub mod assistant;
pub mod window;

pub use assistant::{DocsAssistant, WELCOME_MESSAGE};
pub use window::ChatWindow;
