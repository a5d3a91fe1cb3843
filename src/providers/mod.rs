//! Model gateway module for Astrai
//!
//! This module contains the gateway abstraction used by both the chat
//! session and the daily content pipeline, and the Gemini implementation.

pub mod base;
pub mod gemini;

pub use base::{
    ConverseRequest, GenerateRequest, GenerationTool, ModelGateway, ModelReply, ToolCall,
    ToolResult, Turn,
};
pub use gemini::GeminiGateway;

use crate::config::GatewayConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the configured gateway instance
///
/// # Errors
///
/// Returns error if credentials are missing or the HTTP client cannot be built
pub fn create_gateway(config: &GatewayConfig) -> Result<Arc<dyn ModelGateway>> {
    Ok(Arc::new(GeminiGateway::new(config)?))
}
