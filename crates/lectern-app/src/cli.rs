//! CLI argument definitions for the Lectern client.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lectern_agent::DEFAULT_PAGE_LIMIT;
use lectern_core::AgentKind;

/// Command-line client for the documentation assistant backend.
#[derive(Parser, Debug)]
#[command(name = "lectern", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the reasoning backend.
    #[arg(short = 'b', long = "backend-url")]
    pub backend_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a query to the assistant and print its reply.
    Ask {
        /// The question to ask.
        query: String,

        /// Page path sent as reading context (e.g. /chapters/3).
        #[arg(short = 'p', long = "page")]
        page: Option<String>,

        /// Conversation id to resume instead of starting fresh.
        #[arg(long = "conversation")]
        conversation: Option<String>,

        /// Agent to address: triage, summarizer, or rag.
        #[arg(short = 'a', long = "agent", value_parser = parse_agent_kind)]
        agent: Option<AgentKind>,
    },

    /// Print the persisted history of one conversation.
    History {
        /// Conversation id to fetch.
        conversation_id: String,

        /// Maximum number of messages to fetch.
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,

        /// Number of messages to skip from the start.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// List the conversations visible to the current identity.
    Conversations,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > LECTERN_CONFIG env var > platform default
    /// (~/.lectern/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("LECTERN_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the backend base URL.
    ///
    /// Priority: --backend-url flag > LECTERN_BACKEND_URL env var > config
    /// file value.
    pub fn resolve_backend_url(&self, config_url: &str) -> String {
        if let Some(ref url) = self.backend_url {
            return url.clone();
        }
        if let Ok(url) = std::env::var("LECTERN_BACKEND_URL") {
            return url;
        }
        config_url.to_string()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value. Returns `None` if not
    /// overridden. `RUST_LOG` is handled by the EnvFilter and wins over both.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Parse an agent kind from its wire name.
fn parse_agent_kind(s: &str) -> Result<AgentKind, String> {
    match s {
        "triage" => Ok(AgentKind::Triage),
        "summarizer" => Ok(AgentKind::Summarizer),
        "rag" => Ok(AgentKind::Rag),
        _ => Err(format!(
            "unknown agent '{s}' (expected triage, summarizer, or rag)"
        )),
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".lectern").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".lectern").join("config.toml");
    }
    PathBuf::from("config.toml")
}

// =============================================================================
// Tests
// =============================================================================
