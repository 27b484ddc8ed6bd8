//! Lifecycle coordinator for one open chat window.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use lectern_agent::{
    AgentClient, AgentDispatcher, ConversationLoader, DispatchOutcome, DispatchRequest, SkipReason,
};
use lectern_core::{AgentKind, ConversationId};
use lectern_identity::IdentityAccessor;
use lectern_select::Intent;
use lectern_session::SessionStore;

/// One open chat window: a session store plus the dispatcher that feeds it.
///
/// The window owns the conversation for its lifetime. Opening hydrates
/// resumed history and applies the opening intent; closing disposes the
/// store so late responses are discarded. A selection intent's source text
/// and agent hint become window context attached to every later send, so
/// follow-up questions stay with the same passage and agent.
pub struct ChatWindow {
    store: Arc<SessionStore>,
    dispatcher: AgentDispatcher,
    pending_input: Mutex<String>,
    highlighted_context: Mutex<Option<String>>,
    agent_hint: Mutex<Option<AgentKind>>,
    auto_submitted: AtomicBool,
}

impl ChatWindow {
    /// Opens a window, hydrating history when `resume_id` is given and
    /// applying `initial_intent` once the transcript is in place.
    pub async fn open(
        client: AgentClient,
        identity: Arc<dyn IdentityAccessor>,
        resume_id: Option<&str>,
        initial_intent: Option<Intent>,
        current_page: Option<String>,
    ) -> Self {
        let store = Arc::new(SessionStore::new());
        store.start(resume_id);

        let loader = ConversationLoader::new(client.clone(), identity.clone());
        loader.hydrate(&store).await;

        let window = Self {
            dispatcher: AgentDispatcher::new(client, store.clone(), identity),
            store,
            pending_input: Mutex::new(String::new()),
            highlighted_context: Mutex::new(None),
            agent_hint: Mutex::new(None),
            auto_submitted: AtomicBool::new(false),
        };

        if let Some(intent) = initial_intent {
            window.apply_intent(intent, current_page).await;
        }
        window
    }

    /// Applies a committed selection intent to this window.
    ///
    /// A summarize intent dispatches immediately (forced past the busy
    /// guard) and at most once per window; an ask intent pre-fills the
    /// pending input instead. Either way the intent's selection and hint
    /// replace the window context.
    pub async fn apply_intent(
        &self,
        intent: Intent,
        current_page: Option<String>,
    ) -> Option<DispatchOutcome> {
        if intent.auto_dispatch {
            if self.auto_submitted.swap(true, Ordering::SeqCst) {
                tracing::debug!("Auto-dispatch already fired for this window");
                return None;
            }
            self.set_context(Some(intent.source_text.clone()), intent.agent_hint);
            let outcome = self
                .dispatcher
                .dispatch(DispatchRequest {
                    query: intent.presented_text,
                    agent_hint: intent.agent_hint,
                    current_page,
                    highlighted_text: Some(intent.source_text),
                    force: true,
                })
                .await;
            Some(outcome)
        } else {
            self.set_context(None, intent.agent_hint);
            self.set_pending_input(&intent.presented_text);
            None
        }
    }

    /// Dispatches one query from this window, carrying the window context.
    pub async fn send(&self, query: &str, current_page: Option<String>) -> DispatchOutcome {
        let (highlighted_text, agent_hint) = self.context();
        self.dispatcher
            .dispatch(DispatchRequest {
                query: query.to_string(),
                agent_hint,
                current_page,
                highlighted_text,
                force: false,
            })
            .await
    }

    /// Sends whatever is in the pending input, clearing it when the
    /// dispatch actually goes out.
    pub async fn send_pending(&self, current_page: Option<String>) -> DispatchOutcome {
        let query = self.pending_input();
        if query.trim().is_empty() {
            return DispatchOutcome::Skipped(SkipReason::EmptyQuery);
        }
        if self.dispatcher.is_in_flight() {
            return DispatchOutcome::Skipped(SkipReason::InFlight);
        }
        self.set_pending_input("");
        self.send(&query, current_page).await
    }

    /// Detaches from the current conversation and starts a fresh local one.
    /// Window context and pending input are cleared; the auto-dispatch latch
    /// is not (it is per window, not per conversation).
    pub fn new_conversation(&self) -> ConversationId {
        self.set_context(None, None);
        self.set_pending_input("");
        self.store.reset()
    }

    /// Closes the window. The store is disposed, so responses resolving
    /// after this point are discarded.
    pub fn close(&self) {
        self.store.dispose();
    }

    // -- Read surface --

    pub fn store(&self) -> Arc<SessionStore> {
        Arc::clone(&self.store)
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.store.conversation_id()
    }

    pub fn pending_input(&self) -> String {
        self.pending_input
            .lock()
            .map(|input| input.clone())
            .unwrap_or_default()
    }

    pub fn set_pending_input(&self, text: &str) {
        match self.pending_input.lock() {
            Ok(mut input) => *input = text.to_string(),
            Err(e) => tracing::error!("Input lock poisoned: {}", e),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.dispatcher.is_in_flight()
    }

    pub fn has_auto_submitted(&self) -> bool {
        self.auto_submitted.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.store.is_disposed()
    }

    // -- Private helpers --

    fn set_context(&self, highlighted: Option<String>, hint: Option<AgentKind>) {
        match self.highlighted_context.lock() {
            Ok(mut context) => *context = highlighted,
            Err(e) => tracing::error!("Context lock poisoned: {}", e),
        }
        match self.agent_hint.lock() {
            Ok(mut agent_hint) => *agent_hint = hint,
            Err(e) => tracing::error!("Context lock poisoned: {}", e),
        }
    }

    fn context(&self) -> (Option<String>, Option<AgentKind>) {
        let highlighted = self
            .highlighted_context
            .lock()
            .map(|context| context.clone())
            .unwrap_or_default();
        let hint = self.agent_hint.lock().map(|hint| *hint).unwrap_or_default();
        (highlighted, hint)
    }
}

// =============================================================================
// Tests
// =============================================================================
