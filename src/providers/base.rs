//! Gateway trait and wire-neutral exchange types
//!
//! This module defines the [`ModelGateway`] trait that every generative
//! backend implements, together with the request and reply types of the
//! two-round tool-call exchange. The types carry no transport detail; the
//! Gemini REST mapping lives in [`super::gemini`].

use crate::error::Result;
use crate::tools::ToolDeclaration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A structured request from the model to run a named local tool
///
/// The `id` correlates the call with exactly one [`ToolResult`] in the
/// follow-up request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier echoed back in the matching [`ToolResult`]
    pub id: String,
    /// Name of the tool to execute
    pub name: String,
    /// Named arguments supplied by the model
    #[serde(default)]
    pub args: Map<String, Value>,
    /// Opaque signature the model attaches to its call; must be replayed verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl ToolCall {
    /// Creates a new tool call
    ///
    /// # Examples
    ///
    /// ```
    /// use astrai::providers::ToolCall;
    ///
    /// let call = ToolCall::new("call_0", "get_system_status", serde_json::Map::new());
    /// assert_eq!(call.name, "get_system_status");
    /// assert!(call.args.is_empty());
    /// ```
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
            thought_signature: None,
        }
    }

    /// Attaches the signature returned alongside the call
    pub fn with_thought_signature(mut self, signature: Option<String>) -> Self {
        self.thought_signature = signature;
        self
    }
}

/// The answer to one [`ToolCall`], submitted in the second round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Same identifier as the originating call
    pub id: String,
    /// Name of the tool that produced the response
    pub name: String,
    /// JSON payload returned to the model
    pub response: Value,
}

/// One entry of the conversation replayed to the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Turn {
    /// Text written by the user
    User(String),
    /// Text written by the model
    Model(String),
    /// Tool calls issued by the model in the previous round
    ToolCalls(Vec<ToolCall>),
    /// Results answering the preceding tool calls
    ToolResults(Vec<ToolResult>),
}

/// Everything the gateway needs for one conversational round
#[derive(Debug, Clone, PartialEq)]
pub struct ConverseRequest {
    /// Model identifier
    pub model: String,
    /// System instruction built from the persona
    pub system_prompt: String,
    /// Tool declarations offered to the model
    pub tools: Vec<ToolDeclaration>,
    /// Ordered turns, oldest first
    pub turns: Vec<Turn>,
}

impl ConverseRequest {
    /// Returns the ids of all tool calls present in the request
    pub fn tool_call_ids(&self) -> Vec<&str> {
        self.turns
            .iter()
            .filter_map(|turn| match turn {
                Turn::ToolCalls(calls) => Some(calls.iter().map(|c| c.id.as_str())),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Returns the ids of all tool results present in the request
    pub fn tool_result_ids(&self) -> Vec<&str> {
        self.turns
            .iter()
            .filter_map(|turn| match turn {
                Turn::ToolResults(results) => Some(results.iter().map(|r| r.id.as_str())),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

/// Reply to a conversational round
///
/// Carries either text or one or more tool calls. Callers must not assume
/// both are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    /// Free text, if the model answered directly
    pub text: Option<String>,
    /// Tool calls, if the model asked for local execution
    pub tool_calls: Vec<ToolCall>,
}

impl ModelReply {
    /// Creates a plain text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Creates a reply that only carries tool calls
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: None,
            tool_calls,
        }
    }

    /// Returns true if the model asked for tool execution
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Capabilities that may augment one-shot generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationTool {
    /// Ground the answer with live web search results
    SearchGrounding,
}

/// A one-shot generation request used by the batch content pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Model identifier
    pub model: String,
    /// Complete prompt text
    pub prompt: String,
    /// Optional augmentation capabilities
    pub tools: Vec<GenerationTool>,
}

impl GenerateRequest {
    /// Creates a request without augmentation
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            tools: Vec::new(),
        }
    }

    /// Adds an augmentation capability
    pub fn with_tool(mut self, tool: GenerationTool) -> Self {
        if !self.tools.contains(&tool) {
            self.tools.push(tool);
        }
        self
    }
}

/// Boundary to the remote generative-model service
///
/// # Examples
///
/// ```no_run
/// use astrai::providers::{ConverseRequest, GenerateRequest, ModelGateway, ModelReply};
/// use astrai::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoGateway;
///
/// #[async_trait]
/// impl ModelGateway for EchoGateway {
///     async fn converse(&self, _request: &ConverseRequest) -> Result<ModelReply> {
///         Ok(ModelReply::text("echo"))
///     }
///
///     async fn generate(&self, request: &GenerateRequest) -> Result<String> {
///         Ok(request.prompt.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Runs one conversational round with tool declarations attached
    ///
    /// # Errors
    ///
    /// Returns error if the call fails or the reply cannot be decoded
    async fn converse(&self, request: &ConverseRequest) -> Result<ModelReply>;

    /// Runs a one-shot generation and returns the produced text
    ///
    /// # Errors
    ///
    /// Returns error if the call fails or the reply carries no text
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}
