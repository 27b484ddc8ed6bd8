//! Dispatch of user queries to the backend agents.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lectern_core::{AgentKind, Turn};
use lectern_identity::{resolve_identity, IdentityAccessor};
use lectern_session::SessionStore;

use crate::client::{AgentClient, AgentRunRequest};

/// Reply substituted when the exchange fails for any reason.
pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// One query to dispatch, with whatever context the surface can supply.
#[derive(Clone, Debug, Default)]
pub struct DispatchRequest {
    pub query: String,
    /// Routes to a specific agent; `None` leaves routing to triage.
    pub agent_hint: Option<AgentKind>,
    pub current_page: Option<String>,
    pub highlighted_text: Option<String>,
    /// Bypasses the busy guard. Set for programmatic sends that must not be
    /// dropped because an earlier exchange is still in flight.
    pub force: bool,
}

impl DispatchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// What became of one dispatch call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The backend replied and its turn was recorded.
    Replied,
    /// The exchange failed; the fallback reply was recorded instead.
    Fallback,
    /// Nothing was sent.
    Skipped(SkipReason),
}

/// Why a dispatch was dropped before anything was sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The query was empty once trimmed.
    EmptyQuery,
    /// An earlier exchange was still in flight.
    InFlight,
}

/// Sends user queries to the backend and records both sides of the exchange
/// in the session store.
///
/// The user's turn is recorded before the exchange starts, so it stays
/// visible even when the backend never answers. One exchange runs at a time;
/// a failure becomes a [`FALLBACK_REPLY`] turn rather than an error.
pub struct AgentDispatcher {
    client: AgentClient,
    store: Arc<SessionStore>,
    identity: Arc<dyn IdentityAccessor>,
    in_flight: AtomicBool,
}

impl AgentDispatcher {
    pub fn new(
        client: AgentClient,
        store: Arc<SessionStore>,
        identity: Arc<dyn IdentityAccessor>,
    ) -> Self {
        Self {
            client,
            store,
            identity,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Runs one exchange end to end.
    ///
    /// Guards first: an empty query is dropped, and a dispatch arriving while
    /// another is in flight is dropped unless [`DispatchRequest::force`] is
    /// set. Past the guards, the user's turn is appended, identity is
    /// resolved best-effort, and the backend's reply (or the fallback) is
    /// appended when it lands.
    pub async fn dispatch(&self, request: DispatchRequest) -> DispatchOutcome {
        if request.query.trim().is_empty() {
            return DispatchOutcome::Skipped(SkipReason::EmptyQuery);
        }

        if request.force {
            self.in_flight.store(true, Ordering::SeqCst);
        } else if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Dispatch skipped, an exchange is already in flight");
            return DispatchOutcome::Skipped(SkipReason::InFlight);
        }

        let outcome = self.exchange(request).await;
        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn exchange(&self, request: DispatchRequest) -> DispatchOutcome {
        let conversation_id = self.store.conversation_id();
        self.store.append_turn(Turn::user(request.query.clone()));

        let identity = resolve_identity(self.identity.as_ref()).await;
        let run = AgentRunRequest {
            agent_type: request.agent_hint.unwrap_or_default(),
            query: request.query,
            current_page: request.current_page,
            highlighted_text: request.highlighted_text,
            session_id: Some(conversation_id.to_string()),
        };

        match self.client.run_agent(&run, &identity).await {
            Ok(response) => {
                tracing::info!(
                    conversation_id = %conversation_id,
                    agent = %response.agent_used,
                    sources = response.sources.len(),
                    "Agent replied"
                );
                self.store
                    .append_turn(Turn::assistant(response.message, response.sources));
                DispatchOutcome::Replied
            }
            Err(e) => {
                tracing::warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "Agent run failed, recording fallback reply"
                );
                self.store
                    .append_turn(Turn::assistant(FALLBACK_REPLY.to_string(), Vec::new()));
                DispatchOutcome::Fallback
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
