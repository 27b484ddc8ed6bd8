//! The store behind one open chat window.
//!
//! All mutations are single synchronous appends driven by one event at a
//! time; observers are notified after each commit, outside the state lock.

use std::sync::Mutex;

use chrono::Utc;

use lectern_core::{Conversation, ConversationId, Role, SessionEvent, Turn, DEFAULT_TITLE};

/// Maximum derived-title length in characters.
pub const TITLE_MAX_CHARS: usize = 30;

/// Marker appended when a derived title was truncated.
const TITLE_ELLIPSIS: &str = "...";

type EventObserver = Box<dyn Fn(&SessionEvent) + Send + Sync>;

struct StoreState {
    conversation: Conversation,
    resumed: bool,
    pending_hydration: bool,
    disposed: bool,
}

/// Single source of truth for the active conversation of one chat window.
///
/// Holds the ordered turn log, the conversation identifier, and the display
/// title. Exactly one conversation is active at a time; starting a new one
/// atomically replaces both `id` and `turns`. After [`dispose`] every
/// mutation becomes a no-op, so responses resolving late are discarded
/// rather than applied to a closed window.
///
/// [`dispose`]: SessionStore::dispose
pub struct SessionStore {
    state: Mutex<StoreState>,
    observers: Mutex<Vec<EventObserver>>,
}

impl SessionStore {
    /// Creates a store holding a fresh local conversation.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                conversation: Conversation::new_local(),
                resumed: false,
                pending_hydration: false,
                disposed: false,
            }),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Begins a conversation.
    ///
    /// With `resume_id` the store takes the external id and marks itself
    /// pending hydration (the conversation loader fills the turns). Without,
    /// it mints a fresh local id and leaves the turn log empty.
    pub fn start(&self, resume_id: Option<&str>) {
        let event = {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!("Store lock poisoned: {}", e);
                    return;
                }
            };
            if state.disposed {
                return;
            }
            state.conversation = match resume_id {
                Some(id) => Conversation::resumed(ConversationId::from(id)),
                None => Conversation::new_local(),
            };
            state.resumed = resume_id.is_some();
            state.pending_hydration = resume_id.is_some();
            SessionEvent::ConversationStarted {
                conversation_id: state.conversation.id.clone(),
                resumed: resume_id.is_some(),
                timestamp: Utc::now(),
            }
        };
        tracing::debug!(
            event = event.event_name(),
            resumed = resume_id.is_some(),
            "Conversation started"
        );
        self.notify(&event);
    }

    /// Appends a turn at the tail of the log.
    ///
    /// The first user turn in a conversation derives the display title from
    /// its content. Ignored after dispose.
    pub fn append_turn(&self, turn: Turn) {
        let events = {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!("Store lock poisoned: {}", e);
                    return;
                }
            };
            if state.disposed {
                tracing::debug!(turn_id = %turn.id, "Turn discarded after dispose");
                return;
            }

            let first_user_turn = turn.role == Role::User
                && !state.conversation.turns.iter().any(|t| t.role == Role::User);

            let mut events = vec![SessionEvent::TurnAppended {
                conversation_id: state.conversation.id.clone(),
                turn_id: turn.id.clone(),
                role: turn.role,
                timestamp: Utc::now(),
            }];

            if first_user_turn {
                state.conversation.title = derive_title(&turn.content);
                events.push(SessionEvent::TitleChanged {
                    conversation_id: state.conversation.id.clone(),
                    title: state.conversation.title.clone(),
                    timestamp: Utc::now(),
                });
            }

            state.conversation.turns.push(turn);
            events
        };
        for event in &events {
            self.notify(event);
        }
    }

    /// Detaches the local view from the current conversation: clears the
    /// turn log, restores the placeholder title, and mints a new local id.
    ///
    /// Backend-persisted history is untouched. Returns the new id.
    pub fn reset(&self) -> ConversationId {
        let (event, new_id) = {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!("Store lock poisoned: {}", e);
                    return ConversationId::local();
                }
            };
            if state.disposed {
                return state.conversation.id.clone();
            }
            let previous_id = state.conversation.id.clone();
            state.conversation = Conversation::new_local();
            state.resumed = false;
            state.pending_hydration = false;
            let new_id = state.conversation.id.clone();
            (
                SessionEvent::ConversationReset {
                    previous_id,
                    conversation_id: new_id.clone(),
                    timestamp: Utc::now(),
                },
                new_id,
            )
        };
        tracing::debug!(event = event.event_name(), conversation = %new_id, "Conversation reset");
        self.notify(&event);
        new_id
    }

    /// Replaces the turn log wholesale with backend history.
    ///
    /// Never additive, so repeated hydration cannot duplicate turns. Clears
    /// the pending-hydration flag and re-derives the title from the first
    /// user turn when one exists. Ignored after dispose.
    pub fn replace_turns(&self, turns: Vec<Turn>) {
        let events = {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!("Store lock poisoned: {}", e);
                    return;
                }
            };
            if state.disposed {
                tracing::debug!("Hydrated turns discarded after dispose");
                return;
            }

            state.conversation.turns = turns;
            state.pending_hydration = false;

            let mut events = vec![SessionEvent::ConversationHydrated {
                conversation_id: state.conversation.id.clone(),
                turn_count: state.conversation.turns.len(),
                timestamp: Utc::now(),
            }];

            let derived = state
                .conversation
                .turns
                .iter()
                .find(|t| t.role == Role::User)
                .map(|t| derive_title(&t.content));
            if let Some(title) = derived {
                if title != state.conversation.title {
                    state.conversation.title = title.clone();
                    events.push(SessionEvent::TitleChanged {
                        conversation_id: state.conversation.id.clone(),
                        title,
                        timestamp: Utc::now(),
                    });
                }
            }
            events
        };
        for event in &events {
            self.notify(event);
        }
    }

    /// Clears the pending-hydration flag without touching the turn log.
    ///
    /// Used when hydration failed and the empty pre-hydration state stands
    /// as the degraded result.
    pub fn abandon_hydration(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.pending_hydration = false;
        }
    }

    /// Marks the store closed. Every later mutation is a silent no-op, which
    /// discards in-flight responses instead of applying them.
    pub fn dispose(&self) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(e) => {
                tracing::error!("Store lock poisoned: {}", e);
                return;
            }
        };
        state.disposed = true;
        tracing::debug!(conversation = %state.conversation.id, "Session store disposed");
    }

    /// Registers an observer invoked synchronously after each committed
    /// mutation, outside the state lock.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(Box::new(observer));
        }
    }

    // -- Read surface --

    pub fn conversation_id(&self) -> ConversationId {
        self.state
            .lock()
            .map(|s| s.conversation.id.clone())
            .unwrap_or_else(|_| ConversationId::local())
    }

    pub fn title(&self) -> String {
        self.state
            .lock()
            .map(|s| s.conversation.title.clone())
            .unwrap_or_else(|_| DEFAULT_TITLE.to_string())
    }

    /// Cloned snapshot of the turn log.
    pub fn turns(&self) -> Vec<Turn> {
        self.state
            .lock()
            .map(|s| s.conversation.turns.clone())
            .unwrap_or_default()
    }

    pub fn turn_count(&self) -> usize {
        self.state.lock().map(|s| s.conversation.turns.len()).unwrap_or(0)
    }

    /// Cloned snapshot of the whole conversation, for rendering.
    pub fn snapshot(&self) -> Conversation {
        self.state
            .lock()
            .map(|s| s.conversation.clone())
            .unwrap_or_else(|_| Conversation::new_local())
    }

    /// True when the conversation id was supplied externally, so backend
    /// history exists (or existed) under it.
    pub fn is_resumed(&self) -> bool {
        self.state.lock().map(|s| s.resumed).unwrap_or(false)
    }

    pub fn is_pending_hydration(&self) -> bool {
        self.state.lock().map(|s| s.pending_hydration).unwrap_or(false)
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().map(|s| s.disposed).unwrap_or(true)
    }

    // -- Private helpers --

    fn notify(&self, event: &SessionEvent) {
        let observers = match self.observers.lock() {
            Ok(observers) => observers,
            Err(_) => return,
        };
        for observer in observers.iter() {
            observer(event);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a display title from the first user turn: the first
/// `TITLE_MAX_CHARS` characters, with an ellipsis marker when truncated.
pub fn derive_title(content: &str) -> String {
    let mut title: String = content.chars().take(TITLE_MAX_CHARS).collect();
    if content.chars().count() > TITLE_MAX_CHARS {
        title.push_str(TITLE_ELLIPSIS);
    }
    title
}

// =============================================================================
// Tests
// =============================================================================
