//! Hydration of resumed conversations from persisted history.

use std::sync::Arc;

use lectern_identity::{resolve_identity, IdentityAccessor};
use lectern_session::SessionStore;

use crate::client::{AgentClient, MessagePage};

/// What became of one hydration attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// History fetched and installed; carries the installed turn count.
    Hydrated(usize),
    /// The store was not awaiting hydration; nothing was fetched.
    Skipped,
    /// History could not be fetched; the conversation continues empty.
    Unavailable,
}

/// Fetches persisted history into a store that resumed an existing
/// conversation.
///
/// Hydration is strictly best-effort: a backend that is down or that no
/// longer knows the conversation leaves the store empty and usable, never in
/// an error state. Re-invocation replaces the turns with the latest snapshot
/// wholesale, so repeated mounts cannot duplicate history.
pub struct ConversationLoader {
    client: AgentClient,
    identity: Arc<dyn IdentityAccessor>,
}

impl ConversationLoader {
    pub fn new(client: AgentClient, identity: Arc<dyn IdentityAccessor>) -> Self {
        Self { client, identity }
    }

    pub async fn hydrate(&self, store: &SessionStore) -> HydrationOutcome {
        if store.is_disposed() || !store.is_resumed() {
            tracing::debug!("Hydration skipped, no resumed conversation to fetch");
            return HydrationOutcome::Skipped;
        }

        let conversation_id = store.conversation_id();
        let identity = resolve_identity(self.identity.as_ref()).await;

        match self
            .client
            .fetch_messages(conversation_id.as_str(), MessagePage::default(), &identity)
            .await
        {
            Ok(turns) => {
                let count = turns.len();
                store.replace_turns(turns);
                tracing::info!(
                    conversation_id = %conversation_id,
                    turns = count,
                    "Conversation hydrated"
                );
                HydrationOutcome::Hydrated(count)
            }
            Err(e) => {
                tracing::warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "History fetch failed, continuing with an empty conversation"
                );
                store.abandon_hydration();
                HydrationOutcome::Unavailable
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
