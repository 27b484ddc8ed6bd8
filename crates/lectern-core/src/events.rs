use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ConversationId, Role};

/// Notifications emitted by a session store after its state changes.
///
/// Events are consumed by:
/// - The presentation surface (re-render on every mutation)
/// - Structured logs (via `event_name()`)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SessionEvent {
    /// A conversation became active, fresh or resumed.
    ConversationStarted {
        conversation_id: ConversationId,
        resumed: bool,
        timestamp: DateTime<Utc>,
    },

    /// A turn was appended at the tail of the active conversation.
    TurnAppended {
        conversation_id: ConversationId,
        turn_id: String,
        role: Role,
        timestamp: DateTime<Utc>,
    },

    /// The display title was derived or replaced.
    TitleChanged {
        conversation_id: ConversationId,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// The local view detached from the previous conversation and a fresh
    /// local id took its place.
    ConversationReset {
        previous_id: ConversationId,
        conversation_id: ConversationId,
        timestamp: DateTime<Utc>,
    },

    /// Backend history replaced the turn log wholesale.
    ConversationHydrated {
        conversation_id: ConversationId,
        turn_count: usize,
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Returns the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SessionEvent::ConversationStarted { timestamp, .. }
            | SessionEvent::TurnAppended { timestamp, .. }
            | SessionEvent::TitleChanged { timestamp, .. }
            | SessionEvent::ConversationReset { timestamp, .. }
            | SessionEvent::ConversationHydrated { timestamp, .. } => *timestamp,
        }
    }

    /// Returns a human-readable event name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::ConversationStarted { .. } => "conversation_started",
            SessionEvent::TurnAppended { .. } => "turn_appended",
            SessionEvent::TitleChanged { .. } => "title_changed",
            SessionEvent::ConversationReset { .. } => "conversation_reset",
            SessionEvent::ConversationHydrated { .. } => "conversation_hydrated",
        }
    }
}
