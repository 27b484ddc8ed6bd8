//! HTTP client for the agent backend.

use chrono::{DateTime, NaiveDateTime, Utc};
use lectern_core::types::new_turn_id;
use lectern_core::{AgentKind, Citation, LecternError, Result, Role, Turn};
use lectern_identity::{IdentityHeaders, AUTHORIZATION_HEADER, USER_ID_HEADER};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Page size used when none is requested.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

// =============================================================================
// Wire Types
// =============================================================================

/// Body of one agent run.
#[derive(Clone, Debug, Serialize)]
pub struct AgentRunRequest {
    pub agent_type: AgentKind,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AgentRunRequest {
    /// Builds a minimal triage run carrying only the query.
    pub fn new(query: String) -> Self {
        Self {
            agent_type: AgentKind::default(),
            query,
            current_page: None,
            highlighted_text: None,
            session_id: None,
        }
    }
}

/// Reply of one agent run.
#[derive(Clone, Debug, Deserialize)]
pub struct AgentRunResponse {
    pub message: String,
    #[serde(default)]
    pub sources: Vec<Citation>,
    #[serde(default)]
    pub agent_used: String,
    #[serde(default)]
    pub timestamp: String,
}

/// One persisted message as the backend serializes it. Field names and
/// presence vary across backend revisions, so everything but `role` and
/// `content` is tolerated when absent.
#[derive(Clone, Debug, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub id: Option<String>,
    pub role: String,
    pub content: String,
    #[serde(default, alias = "timestamp")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sources: Vec<Citation>,
}

impl WireMessage {
    /// Converts a persisted message into a turn, minting an id and stamping
    /// the current time where the backend left gaps.
    pub fn into_turn(self) -> Turn {
        let role = if self.role == "assistant" {
            Role::Assistant
        } else {
            Role::User
        };
        let created_at = self
            .created_at
            .as_deref()
            .and_then(parse_wire_timestamp)
            .unwrap_or_else(Utc::now);
        Turn {
            id: self.id.unwrap_or_else(new_turn_id),
            role,
            content: self.content,
            created_at,
            sources: self.sources,
        }
    }
}

/// One row in the conversation listing.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Window of a conversation's message history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessagePage {
    pub limit: u32,
    pub offset: u32,
}

impl Default for MessagePage {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Thin typed wrapper over the backend's HTTP surface.
///
/// Identity headers are supplied per call rather than baked into the client,
/// so each exchange carries whatever the provider could resolve at that
/// moment.
#[derive(Clone, Debug)]
pub struct AgentClient {
    http: reqwest::Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs one agent exchange and returns its reply.
    pub async fn run_agent(
        &self,
        request: &AgentRunRequest,
        identity: &IdentityHeaders,
    ) -> Result<AgentRunResponse> {
        let builder = self
            .http
            .post(format!("{}/agents/run", self.base_url))
            .json(request);
        send_json(apply_identity(builder, identity), "agent run").await
    }

    /// Fetches one page of a conversation's persisted messages, oldest
    /// first, converted into turns.
    pub async fn fetch_messages(
        &self,
        conversation_id: &str,
        page: MessagePage,
        identity: &IdentityHeaders,
    ) -> Result<Vec<Turn>> {
        let builder = self
            .http
            .get(format!(
                "{}/conversations/{}/messages",
                self.base_url, conversation_id
            ))
            .query(&[("limit", page.limit), ("offset", page.offset)]);
        let messages: Vec<WireMessage> =
            send_json(apply_identity(builder, identity), "message fetch").await?;
        Ok(messages.into_iter().map(WireMessage::into_turn).collect())
    }

    /// Lists the conversations visible to the calling identity.
    pub async fn list_conversations(
        &self,
        identity: &IdentityHeaders,
    ) -> Result<Vec<ConversationSummary>> {
        let builder = self.http.get(format!("{}/conversations/", self.base_url));
        send_json(apply_identity(builder, identity), "conversation listing").await
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

fn apply_identity(
    mut builder: reqwest::RequestBuilder,
    identity: &IdentityHeaders,
) -> reqwest::RequestBuilder {
    if let Some(user_id) = &identity.user_id {
        builder = builder.header(USER_ID_HEADER, user_id);
    }
    if let Some(bearer) = identity.bearer_value() {
        builder = builder.header(AUTHORIZATION_HEADER, bearer);
    }
    builder
}

async fn send_json<T: DeserializeOwned>(
    builder: reqwest::RequestBuilder,
    context: &str,
) -> Result<T> {
    let response = builder
        .send()
        .await
        .map_err(|e| LecternError::Backend(format!("{context}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LecternError::Backend(format!(
            "{context}: backend returned {status}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| LecternError::Backend(format!("{context}: {e}")))
}

/// Parses a backend timestamp. Accepts RFC 3339 and the zone-less ISO 8601
/// form some backend revisions emit, which is taken as UTC.
fn parse_wire_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// =============================================================================
// Tests
// =============================================================================
