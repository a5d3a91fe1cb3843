//! Tools module for Astrai
//!
//! This module contains the tool declarations offered to the model, the
//! registry that dispatches tool calls to local resolvers, and the
//! resolvers themselves. Resolvers are synchronous and never call the
//! model gateway.

pub mod catalog;
pub mod insights;
pub mod navigate;
pub mod product;
pub mod status;

pub use insights::SearchInsightsTool;
pub use navigate::NavigateTool;
pub use product::ProductDatabaseTool;
pub use status::SystemStatusTool;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Payload returned for a tool name with no registered resolver
pub const UNKNOWN_TOOL_ERROR: &str = "UNKNOWN_TOOL: No resolver registered for this function.";

/// Tool declaration offered to the model with every conversational round
///
/// `parameters` uses the Gemini schema dialect (`OBJECT`, `STRING`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Unique tool name
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// Schema describing required and optional named parameters
    pub parameters: Value,
}

impl ToolDeclaration {
    /// Create a new tool declaration
    ///
    /// # Arguments
    ///
    /// * `name` - Tool name
    /// * `description` - Tool description
    /// * `parameters` - Parameter schema
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Product card rendered by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWidget {
    pub name: String,
    pub status: String,
    pub specs: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

/// Telemetry panel rendered by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusWidget {
    pub uptime: String,
    pub neural_load: String,
    pub signal_stability: String,
    pub active_nodes: u32,
    pub core_temperature: String,
    pub memory_integrity: String,
    pub node_id: String,
}

/// Navigation notice rendered by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationWidget {
    pub page: String,
    pub path: String,
}

/// UI rendering hint attached to a chat message
///
/// Serializes as `{"type": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Widget {
    Product(ProductWidget),
    Status(StatusWidget),
    Navigation(NavigationWidget),
}

impl Widget {
    /// Returns the widget type name as seen by the UI
    pub fn kind(&self) -> &'static str {
        match self {
            Widget::Product(_) => "product",
            Widget::Status(_) => "status",
            Widget::Navigation(_) => "navigation",
        }
    }
}

/// Side effect requested by a resolver, dispatched by the session
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredCommand {
    /// Navigate the UI to `path` once `delay` has elapsed
    Navigate { path: String, delay: Duration },
}

/// Outcome of one tool execution
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// JSON payload returned to the model
    pub payload: Value,
    /// Optional UI widget derived from the execution
    pub widget: Option<Widget>,
    /// Optional deferred side effect
    pub deferred: Option<DeferredCommand>,
}

impl ToolOutput {
    /// Create an output carrying only a payload
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            widget: None,
            deferred: None,
        }
    }

    /// Create an error output with a structured `error` field
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(json!({ "error": message.into() }))
    }

    /// Attach a widget
    pub fn with_widget(mut self, widget: Widget) -> Self {
        self.widget = Some(widget);
        self
    }

    /// Attach a deferred command
    pub fn with_deferred(mut self, command: DeferredCommand) -> Self {
        self.deferred = Some(command);
        self
    }

    /// Returns true if the payload carries an `error` field
    pub fn is_error(&self) -> bool {
        self.payload.get("error").is_some()
    }
}

/// Tool executor trait for local resolvers
///
/// Execution is synchronous; resolvers read static or in-memory data only.
///
/// # Examples
///
/// ```
/// use astrai::tools::{ToolDeclaration, ToolExecutor, ToolOutput};
/// use astrai::error::Result;
/// use serde_json::{json, Map, Value};
///
/// struct PingTool;
///
/// impl ToolExecutor for PingTool {
///     fn declaration(&self) -> ToolDeclaration {
///         ToolDeclaration::new("ping", "Replies with pong", json!({"type": "OBJECT", "properties": {}}))
///     }
///
///     fn execute(&self, _args: &Map<String, Value>) -> Result<ToolOutput> {
///         Ok(ToolOutput::new(json!({"result": "pong"})))
///     }
/// }
///
/// assert_eq!(PingTool.declaration().name, "ping");
/// ```
pub trait ToolExecutor: Send + Sync {
    /// Returns the declaration offered to the model
    fn declaration(&self) -> ToolDeclaration;

    /// Executes the tool with the given arguments
    ///
    /// # Errors
    ///
    /// Returns error if the arguments cannot be interpreted. The registry
    /// converts such errors into an error payload.
    fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput>;
}

/// Tool registry mapping tool names to resolvers
///
/// Declarations are returned in registration order so every round offers
/// the same, stable tool list.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolExecutor>>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a registry holding the four standard resolvers
    ///
    /// # Arguments
    ///
    /// * `navigation_delay` - Delay before a requested navigation is applied
    pub fn with_defaults(navigation_delay: Duration) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ProductDatabaseTool::new()));
        registry.register(Arc::new(SystemStatusTool::new()));
        registry.register(Arc::new(NavigateTool::new(navigation_delay)));
        registry.register(Arc::new(SearchInsightsTool::new()));
        registry
    }

    /// Register a tool executor under its declared name
    ///
    /// Registering a second executor with the same name replaces the first.
    pub fn register(&mut self, executor: Arc<dyn ToolExecutor>) {
        let name = executor.declaration().name;
        if self.tools.insert(name.clone(), executor).is_none() {
            self.order.push(name);
        }
    }

    /// Get a tool executor by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolExecutor>> {
        self.tools.get(name).cloned()
    }

    /// Get all tool declarations in registration order
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|executor| executor.declaration())
            .collect()
    }

    /// Execute a tool by name
    ///
    /// Never fails: an unknown name or a resolver error is reported as a
    /// structured `error` field in the returned payload.
    pub fn execute(&self, name: &str, args: &Map<String, Value>) -> ToolOutput {
        let output = match self.get(name) {
            Some(executor) => match executor.execute(args) {
                Ok(output) => output,
                Err(e) => ToolOutput::error(format!("TOOL_FAILURE: {}", e)),
            },
            None => ToolOutput::error(UNKNOWN_TOOL_ERROR),
        };

        tracing::info!(
            target: "tool_audit",
            tool = %name,
            ok = !output.is_error(),
            widget = output.widget.as_ref().map(Widget::kind).unwrap_or("none"),
            "tool executed"
        );
        output
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a string argument, trimming surrounding whitespace
pub(crate) fn string_arg<'a>(args: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
