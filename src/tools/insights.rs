//! search_insights tool
//!
//! Case-insensitive keyword filter over the insight archive and the
//! evolution log. Returns zero or more matches.

use crate::error::Result;
use crate::tools::catalog::{ARCHIVED_POSTS, EVOLUTION_LOG};
use crate::tools::{string_arg, ToolDeclaration, ToolExecutor, ToolOutput};
use serde_json::{json, Map, Value};

/// Tool for searching published insights
#[derive(Debug, Default)]
pub struct SearchInsightsTool;

impl SearchInsightsTool {
    pub fn new() -> Self {
        Self
    }
}

impl ToolExecutor for SearchInsightsTool {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration::new(
            "search_insights",
            "Search Astrai's published insights and evolution logs by keyword. Use this when users ask what Astrai has written or changed.",
            json!({
                "type": "OBJECT",
                "properties": {
                    "keyword": {
                        "type": "STRING",
                        "description": "Keyword to look for in titles, excerpts, tags and log entries"
                    }
                },
                "required": ["keyword"]
            }),
        )
    }

    fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput> {
        let keyword = string_arg(args, "keyword").unwrap_or_default().to_lowercase();
        let matches_keyword = |text: &str| keyword.is_empty() || text.to_lowercase().contains(&keyword);

        let posts: Vec<Value> = ARCHIVED_POSTS
            .iter()
            .filter(|post| {
                matches_keyword(post.title)
                    || matches_keyword(post.excerpt)
                    || post.tags.iter().any(|tag| matches_keyword(tag))
            })
            .map(|post| {
                json!({
                    "kind": "post",
                    "id": post.id,
                    "title": post.title,
                    "excerpt": post.excerpt,
                    "author": post.author,
                    "date": post.date,
                    "path": format!("/insights/{}", post.id),
                })
            })
            .collect();

        let logs = EVOLUTION_LOG
            .iter()
            .filter(|entry| {
                matches_keyword(entry.version)
                    || matches_keyword(entry.module)
                    || matches_keyword(entry.content)
            })
            .map(|entry| {
                json!({
                    "kind": "log",
                    "version": entry.version,
                    "module": entry.module,
                    "date": entry.date,
                    "content": entry.content,
                })
            });

        let results: Vec<Value> = posts.into_iter().chain(logs).collect();
        tracing::debug!("search_insights '{}' matched {} entries", keyword, results.len());

        Ok(ToolOutput::new(json!({
            "keyword": keyword,
            "count": results.len(),
            "results": results,
        })))
    }
}
