//! navigate_to tool
//!
//! Resolves a page name to a site route. Besides the acknowledgement
//! payload it returns a [`DeferredCommand::Navigate`] that the session
//! dispatches after the configured delay; the resolver itself never
//! schedules anything.

use crate::error::Result;
use crate::tools::catalog::ROUTES;
use crate::tools::{
    string_arg, DeferredCommand, NavigationWidget, ToolDeclaration, ToolExecutor, ToolOutput,
    Widget,
};
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Tool for steering the UI to another page
#[derive(Debug, Clone)]
pub struct NavigateTool {
    delay: Duration,
}

impl NavigateTool {
    /// Create the tool with the delay applied before navigation
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

fn resolve_route(page: &str) -> Option<(&'static str, &'static str)> {
    let page = page.trim().trim_start_matches('/').to_lowercase();
    let page = if page.is_empty() { "home".to_string() } else { page };
    ROUTES
        .iter()
        .find(|(name, path)| *name == page || path.trim_start_matches('/') == page)
        .copied()
}

impl ToolExecutor for NavigateTool {
    fn declaration(&self) -> ToolDeclaration {
        let pages: Vec<&str> = ROUTES.iter().map(|(name, _)| *name).collect();
        ToolDeclaration::new(
            "navigate_to",
            "Move the visitor's interface to another section of the site. Use this when users ask to see or go to a page.",
            json!({
                "type": "OBJECT",
                "properties": {
                    "page": {
                        "type": "STRING",
                        "description": format!("Target page, one of: {}", pages.join(", "))
                    }
                },
                "required": ["page"]
            }),
        )
    }

    fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput> {
        let requested = string_arg(args, "page").unwrap_or_default();
        let Some((page, path)) = resolve_route(requested) else {
            return Ok(ToolOutput::error(format!(
                "NAVIGATION_ERROR: Unknown sector '{}'.",
                requested
            )));
        };

        tracing::debug!("Navigation resolved: {} -> {}", page, path);

        Ok(ToolOutput::new(json!({
            "result": format!("Navigation to {} initiated.", path),
            "page": page,
            "path": path,
        }))
        .with_widget(Widget::Navigation(NavigationWidget {
            page: page.to_string(),
            path: path.to_string(),
        }))
        .with_deferred(DeferredCommand::Navigate {
            path: path.to_string(),
            delay: self.delay,
        }))
    }
}
