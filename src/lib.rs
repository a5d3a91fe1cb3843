//! Astrai - conversational neural core and daily signal feed
//!
//! This library provides the client side of the Astrai persona: a chat
//! session that lets the model invoke local tools, and a date-keyed cache
//! of AI-generated posts with retry, fallback and failure classification.
//!
//! # Architecture
//!
//! - `agent`: Chat history and the tool-dispatching conversation session
//! - `providers`: Model gateway abstraction and the Gemini implementation
//! - `tools`: Local resolvers and the tool registry
//! - `content`: Daily posts, deep insight and article backfill
//! - `resilience`: Retry policy, model fallback and error classification
//! - `storage`: Key-value store abstraction (memory and sled)
//! - `prompts`: Persona, system prompt and content prompts
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use astrai::{Config, ConversationSession, ToolRegistry};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let gateway = astrai::providers::create_gateway(&config.gateway)?;
//!     let tools = Arc::new(ToolRegistry::with_defaults(Duration::from_millis(1500)));
//!     let session = ConversationSession::new(gateway, tools, config.chat, config.locale);
//!     session.send("System status?").await;
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod resilience;
pub mod storage;
pub mod tools;

// Re-export commonly used types
pub use agent::{ChatMessage, ConversationSession, SendOutcome};
pub use config::Config;
pub use content::{ContentFailure, DailyContentCache, DailyContentService, Locale};
pub use error::{AstraiError, Result};
pub use tools::ToolRegistry;

#[cfg(test)]
pub mod test_utils;
