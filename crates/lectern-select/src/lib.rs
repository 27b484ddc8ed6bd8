//! Intent capture: translates raw text-selection events into discrete
//! intents (ask, summarize) without touching the session store.

pub mod capture;
pub mod intent;

pub use capture::{MenuAnchor, Selection, SelectionCapture, SelectionRect, Viewport};
pub use intent::{summarize_presented_text, Intent, IntentKind};
