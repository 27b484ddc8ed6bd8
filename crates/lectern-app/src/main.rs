//! Lectern application binary - composition root.
//!
//! Ties together the Lectern crates into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing (RUST_LOG > --log-level > config > "info")
//! 3. Resolve identity from environment variables, best-effort
//! 4. Run the requested command against the reasoning backend

mod cli;

use std::sync::Arc;

use clap::Parser;

use lectern_agent::{
    AgentClient, AgentDispatcher, ConversationLoader, DispatchOutcome, DispatchRequest,
    MessagePage,
};
use lectern_core::{AgentKind, LecternConfig, Turn};
use lectern_identity::{resolve_identity, AnonymousIdentity, IdentityAccessor, StaticIdentity};
use lectern_session::SessionStore;

use cli::{CliArgs, Command};

/// Build the identity accessor from environment variables.
///
/// `LECTERN_USER_ID` selects a static identity; `LECTERN_BEARER_TOKEN`
/// optionally attaches a bearer credential to it. Without a user id the
/// client runs anonymously.
fn identity_from_env() -> Arc<dyn IdentityAccessor> {
    match std::env::var("LECTERN_USER_ID") {
        Ok(user_id) if !user_id.trim().is_empty() => {
            let mut identity = StaticIdentity::new(user_id.clone());
            if let Ok(token) = std::env::var("LECTERN_BEARER_TOKEN") {
                if !token.trim().is_empty() {
                    identity = identity.with_credential(token);
                }
            }
            tracing::info!(user_id = %user_id, "Using static identity from environment");
            Arc::new(identity)
        }
        _ => {
            tracing::debug!("No LECTERN_USER_ID set, running anonymously");
            Arc::new(AnonymousIdentity)
        }
    }
}

/// Print one turn in transcript form, citations indented underneath.
fn print_turn(turn: &Turn) {
    println!(
        "{}  [{}]  {}",
        turn.created_at.format("%Y-%m-%d %H:%M:%S"),
        turn.role.as_str(),
        turn.content
    );
    for citation in &turn.sources {
        println!(
            "        - {} ch.{} p.{}: {}",
            citation.document_slug, citation.chapter_label, citation.page_number, citation.snippet
        );
    }
}

/// One-shot exchange: start (or resume) a conversation, dispatch the query,
/// print the reply.
async fn run_ask(
    client: AgentClient,
    identity: Arc<dyn IdentityAccessor>,
    query: String,
    page: Option<String>,
    conversation: Option<String>,
    agent: Option<AgentKind>,
) {
    let store = Arc::new(SessionStore::new());
    store.start(conversation.as_deref());

    let loader = ConversationLoader::new(client.clone(), identity.clone());
    loader.hydrate(&store).await;

    let dispatcher = AgentDispatcher::new(client, store.clone(), identity);
    let outcome = dispatcher
        .dispatch(DispatchRequest {
            query,
            agent_hint: agent,
            current_page: page,
            highlighted_text: None,
            force: false,
        })
        .await;

    match outcome {
        DispatchOutcome::Replied | DispatchOutcome::Fallback => {
            if let Some(turn) = store.turns().last() {
                print_turn(turn);
            }
            println!();
            println!("conversation: {}", store.conversation_id());
        }
        DispatchOutcome::Skipped(reason) => {
            tracing::warn!(reason = ?reason, "Nothing dispatched");
        }
    }
}

/// Fetch and print one page of a conversation's persisted messages.
async fn run_history(
    client: AgentClient,
    identity: Arc<dyn IdentityAccessor>,
    conversation_id: String,
    page: MessagePage,
) -> lectern_core::Result<()> {
    let headers = resolve_identity(identity.as_ref()).await;
    let turns = client
        .fetch_messages(&conversation_id, page, &headers)
        .await?;

    if turns.is_empty() {
        println!("No messages in conversation {}.", conversation_id);
        return Ok(());
    }
    for turn in &turns {
        print_turn(turn);
    }
    Ok(())
}

/// List the conversations the backend has persisted for this identity.
async fn run_conversations(
    client: AgentClient,
    identity: Arc<dyn IdentityAccessor>,
) -> lectern_core::Result<()> {
    let headers = resolve_identity(identity.as_ref()).await;
    let summaries = client.list_conversations(&headers).await?;

    if summaries.is_empty() {
        println!("No conversations found.");
        return Ok(());
    }
    for summary in &summaries {
        match &summary.updated_at {
            Some(updated) => println!("{}  {}  ({})", summary.id, summary.title, updated),
            None => println!("{}  {}", summary.id, summary.title),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before the subscriber exists, so load-time diagnostics
    // are repeated below once tracing is up.
    let config_file = args.resolve_config_path();
    let config = LecternConfig::load_or_default(&config_file);

    // Tracing. Logs go to stderr so command output stays pipeable.
    let default_level = args
        .resolve_log_level()
        .unwrap_or_else(|| config.general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Lectern v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Backend client and identity.
    let backend_url = args.resolve_backend_url(&config.backend.base_url);
    tracing::info!(backend = %backend_url, "Reasoning backend selected");
    let client = AgentClient::new(&backend_url);
    let identity = identity_from_env();

    match args.command {
        Command::Ask {
            query,
            page,
            conversation,
            agent,
        } => {
            run_ask(client, identity, query, page, conversation, agent).await;
        }
        Command::History {
            conversation_id,
            limit,
            offset,
        } => {
            run_history(client, identity, conversation_id, MessagePage { limit, offset }).await?;
        }
        Command::Conversations => {
            run_conversations(client, identity).await?;
        }
    }

    Ok(())
}
