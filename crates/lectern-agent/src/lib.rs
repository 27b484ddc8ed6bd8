//! Backend exchange layer: the HTTP client for the agent service, the
//! dispatcher that records both sides of an exchange in the session store,
//! and the loader that hydrates resumed conversations.

pub mod client;
pub mod dispatcher;
pub mod loader;

pub use client::{
    AgentClient, AgentRunRequest, AgentRunResponse, ConversationSummary, MessagePage, WireMessage,
    DEFAULT_PAGE_LIMIT,
};
pub use dispatcher::{
    AgentDispatcher, DispatchOutcome, DispatchRequest, SkipReason, FALLBACK_REPLY,
};
pub use loader::{ConversationLoader, HydrationOutcome};
