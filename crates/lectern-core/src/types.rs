use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Which side of the conversation produced a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Typed or selected by the person reading the page.
    User,
    /// Produced by the reasoning backend.
    Assistant,
}

impl Role {
    /// Returns the wire/log representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Backend agent variant addressed by a dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// General-purpose router agent (default when no hint is given).
    #[default]
    Triage,
    /// Condenses a highlighted passage.
    Summarizer,
    /// Retrieval-augmented answering over the document corpus.
    Rag,
}

impl AgentKind {
    /// Returns the wire representation of the agent kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Triage => "triage",
            AgentKind::Summarizer => "summarizer",
            AgentKind::Rag => "rag",
        }
    }
}

// =============================================================================
// Newtype Wrappers - Identity
// =============================================================================

/// Identifier of one conversation.
///
/// Backend-assigned once the conversation has been persisted; before that a
/// locally minted token with a `session_` prefix stands in for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    /// Mints a fresh local (not yet persisted) conversation id.
    pub fn local() -> Self {
        Self(format!("session_{}", Uuid::new_v4().simple()))
    }

    /// True when the id was minted locally and the backend has not yet
    /// assigned its own.
    pub fn is_local(&self) -> bool {
        self.0.starts_with("session_")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::local()
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Core Records
// =============================================================================

/// A structured reference to a source document location, attached to an
/// assistant turn. Purely descriptive; no lifecycle of its own.
///
/// Wire names follow the backend contract: `slug`, `chapter_number`,
/// `page_number`, `snippet`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Citation {
    #[serde(rename = "slug")]
    pub document_slug: String,
    #[serde(rename = "chapter_number")]
    pub chapter_label: String,
    pub page_number: u32,
    pub snippet: String,
}

/// One exchange unit in a conversation. Immutable once appended; the turn
/// log is append-only except for full replacement during hydration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sources: Vec<Citation>,
}

impl Turn {
    /// Builds a user turn stamped with the current time.
    pub fn user(content: String) -> Self {
        Self {
            id: new_turn_id(),
            role: Role::User,
            content,
            created_at: Utc::now(),
            sources: Vec::new(),
        }
    }

    /// Builds an assistant turn carrying the backend's reply and citations.
    pub fn assistant(content: String, sources: Vec<Citation>) -> Self {
        Self {
            id: new_turn_id(),
            role: Role::Assistant,
            content,
            created_at: Utc::now(),
            sources,
        }
    }
}

/// Mints a turn id unique within a conversation.
pub fn new_turn_id() -> String {
    format!("msg_{}", Uuid::new_v4().simple())
}

/// Placeholder title shown until the first user turn derives a real one.
pub const DEFAULT_TITLE: &str = "New conversation";

/// The conversation owned by one session store for the lifetime of one open
/// chat window. Discarded on dispose unless the backend has persisted it
/// under its `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub turns: Vec<Turn>,
}

impl Conversation {
    /// Builds an empty conversation under a freshly minted local id.
    pub fn new_local() -> Self {
        Self {
            id: ConversationId::local(),
            title: DEFAULT_TITLE.to_string(),
            turns: Vec::new(),
        }
    }

    /// Builds an empty conversation under an externally supplied id, ready
    /// for hydration.
    pub fn resumed(id: ConversationId) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            turns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_values() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_agent_kind_wire_values() {
        assert_eq!(serde_json::to_string(&AgentKind::Triage).unwrap(), "\"triage\"");
        assert_eq!(
            serde_json::to_string(&AgentKind::Summarizer).unwrap(),
            "\"summarizer\""
        );
        assert_eq!(serde_json::to_string(&AgentKind::Rag).unwrap(), "\"rag\"");
    }

    #[test]
    fn test_agent_kind_defaults_to_triage() {
        assert_eq!(AgentKind::default(), AgentKind::Triage);
    }

    #[test]
    fn test_conversation_id_local() {
        let id = ConversationId::local();
        assert!(id.as_str().starts_with("session_"));
        assert!(id.is_local());

        let backend = ConversationId::from("abc123");
        assert!(!backend.is_local());
        assert_eq!(backend.to_string(), "abc123");
    }

    #[test]
    fn test_conversation_ids_are_unique() {
        let a = ConversationId::local();
        let b = ConversationId::local();
        assert_ne!(a, b);
    }

    #[test]
    fn test_turn_constructors() {
        let user = Turn::user("hello".to_string());
        assert_eq!(user.role, Role::User);
        assert!(user.sources.is_empty());
        assert!(user.id.starts_with("msg_"));

        let assistant = Turn::assistant(
            "hi".to_string(),
            vec![Citation {
                document_slug: "intro".to_string(),
                chapter_label: "1".to_string(),
                page_number: 4,
                snippet: "…".to_string(),
            }],
        );
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.sources.len(), 1);
        assert_ne!(user.id, assistant.id);
    }

    #[test]
    fn test_citation_wire_field_names() {
        let citation = Citation {
            document_slug: "getting-started".to_string(),
            chapter_label: "3".to_string(),
            page_number: 12,
            snippet: "an excerpt".to_string(),
        };
        let json = serde_json::to_value(&citation).unwrap();
        assert_eq!(json["slug"], "getting-started");
        assert_eq!(json["chapter_number"], "3");
        assert_eq!(json["page_number"], 12);
        assert_eq!(json["snippet"], "an excerpt");
    }

    #[test]
    fn test_citation_tolerates_missing_fields() {
        let citation: Citation = serde_json::from_str(r#"{"slug": "only-slug"}"#).unwrap();
        assert_eq!(citation.document_slug, "only-slug");
        assert_eq!(citation.page_number, 0);
        assert!(citation.snippet.is_empty());
    }

    #[test]
    fn test_new_local_conversation() {
        let conversation = Conversation::new_local();
        assert!(conversation.id.is_local());
        assert_eq!(conversation.title, DEFAULT_TITLE);
        assert!(conversation.turns.is_empty());
    }

    #[test]
    fn test_resumed_conversation_keeps_supplied_id() {
        let conversation = Conversation::resumed(ConversationId::from("abc123"));
        assert_eq!(conversation.id.as_str(), "abc123");
        assert!(!conversation.id.is_local());
        assert!(conversation.turns.is_empty());
    }

    #[test]
    fn test_turn_missing_sources_deserializes_empty() {
        let json = r#"{
            "id": "msg_1",
            "role": "assistant",
            "content": "answer",
            "created_at": "2025-05-01T12:00:00Z"
        }"#;
        let turn: Turn = serde_json::from_str(json).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert!(turn.sources.is_empty());
    }
}
