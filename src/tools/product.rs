//! query_product_database tool
//!
//! Static lookup over the product catalog. Keys are normalized and matched
//! case-insensitively with substring tolerance; a miss is reported in the
//! payload, never as an error.

use crate::error::{AstraiError, Result};
use crate::tools::catalog::{ProductRecord, PRODUCTS, PRODUCT_ALIASES};
use crate::tools::{ProductWidget, ToolDeclaration, ToolExecutor, ToolOutput, Widget};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Error text returned when no product matches
pub const PRODUCT_NOT_FOUND: &str = "DATABASE_ERROR: Target node not found.";

const FUZZY_THRESHOLD: f64 = 0.88;

#[derive(Debug, Deserialize)]
struct ProductQueryParams {
    product_id: String,
    #[serde(default)]
    query_type: Option<String>,
}

/// Which public field of a product record is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryType {
    Status,
    PublicSpecs,
    Philosophy,
}

impl QueryType {
    fn parse(raw: &str) -> Option<Self> {
        match normalize_key(raw).as_str() {
            "status" => Some(Self::Status),
            "public_specs" | "specs" => Some(Self::PublicSpecs),
            "philosophy" => Some(Self::Philosophy),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::PublicSpecs => "public_specs",
            Self::Philosophy => "philosophy",
        }
    }

    fn select(self, record: &ProductRecord) -> &'static str {
        match self {
            Self::Status => record.status,
            Self::PublicSpecs => record.public_specs,
            Self::Philosophy => record.philosophy,
        }
    }
}

/// Tool for retrieving public product information
#[derive(Debug, Default)]
pub struct ProductDatabaseTool;

impl ProductDatabaseTool {
    pub fn new() -> Self {
        Self
    }
}

impl ToolExecutor for ProductDatabaseTool {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration::new(
            "query_product_database",
            "Access the restricted internal database to retrieve info about Astrai products (loom v5.0, Narrative Engine, Visual Forge, Project AEON). Use this when users ask for specific details about products.",
            json!({
                "type": "OBJECT",
                "properties": {
                    "product_id": {
                        "type": "STRING",
                        "description": "The ID or name of the product (e.g., \"loom\", \"narrative_engine\", \"visual_forge\")"
                    },
                    "query_type": {
                        "type": "STRING",
                        "description": "What strictly public info to retrieve: \"status\", \"public_specs\", \"philosophy\"."
                    }
                },
                "required": ["product_id", "query_type"]
            }),
        )
    }

    fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput> {
        let params: ProductQueryParams = serde_json::from_value(Value::Object(args.clone()))
            .map_err(|e| AstraiError::Tool(format!("Invalid query_product_database arguments: {}", e)))?;

        tracing::debug!(
            "Querying product database: product_id={}, query_type={:?}",
            params.product_id,
            params.query_type
        );

        let Some(record) = lookup_product(&params.product_id) else {
            return Ok(ToolOutput::error(PRODUCT_NOT_FOUND));
        };

        let payload = match params.query_type.as_deref().and_then(QueryType::parse) {
            Some(query) => json!({
                "product": record.key,
                "query_type": query.as_str(),
                "result": query.select(record),
            }),
            None => json!({
                "product": record.key,
                "status": record.status,
                "public_specs": record.public_specs,
                "philosophy": record.philosophy,
            }),
        };

        Ok(ToolOutput::new(payload).with_widget(Widget::Product(ProductWidget {
            name: record.name.to_string(),
            status: record.status.to_string(),
            specs: record.public_specs.to_string(),
            url: record.url.to_string(),
            external_url: record.external_url.map(str::to_string),
        })))
    }
}

/// Lowercase, trim and fold spaces and hyphens to underscores
fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Resolve a user or model supplied product identifier
///
/// Resolution order: alias, exact key, substring in either direction,
/// Jaro-Winkler similarity above a fixed threshold.
pub fn lookup_product(raw: &str) -> Option<&'static ProductRecord> {
    let key = normalize_key(raw);
    if key.is_empty() {
        return None;
    }

    let key = PRODUCT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, target)| target.to_string())
        .unwrap_or(key);

    if let Some(record) = PRODUCTS.iter().find(|p| p.key == key) {
        return Some(record);
    }

    if key.len() >= 3 {
        if let Some(record) = PRODUCTS
            .iter()
            .find(|p| key.contains(p.key) || p.key.contains(key.as_str()))
        {
            return Some(record);
        }
    }

    PRODUCTS
        .iter()
        .map(|p| (p, strsim::jaro_winkler(&key, p.key)))
        .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(product_id: &str, query_type: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("product_id".to_string(), json!(product_id));
        map.insert("query_type".to_string(), json!(query_type));
        map
    }

    #[test]
    fn test_lookup_exact_and_case_insensitive() {
        assert_eq!(lookup_product("loom").unwrap().key, "loom");
        assert_eq!(lookup_product("Visual Forge").unwrap().key, "visual_forge");
        assert_eq!(lookup_product("NARRATIVE-ENGINE").unwrap().key, "narrative_engine");
    }

    #[test]
    fn test_lookup_alias_and_substring() {
        assert_eq!(lookup_product("loom_v5").unwrap().key, "loom");
        assert_eq!(lookup_product("Astrai Loom (v5.0)").unwrap().key, "loom");
        assert_eq!(lookup_product("aeon").unwrap().key, "project_aeon");
        assert_eq!(lookup_product("the narrative_engine core").unwrap().key, "narrative_engine");
    }

    #[test]
    fn test_lookup_fuzzy_typo() {
        assert_eq!(lookup_product("visual_forj").unwrap().key, "visual_forge");
    }

    #[test]
    fn test_lookup_not_found() {
        assert!(lookup_product("toaster").is_none());
        assert!(lookup_product("   ").is_none());
    }

    #[test]
    fn test_execute_selects_requested_field() {
        let output = ProductDatabaseTool::new()
            .execute(&args("narrative_engine", "philosophy"))
            .unwrap();
        assert!(!output.is_error());
        assert_eq!(
            output.payload["result"],
            "Story is not art; it is engineered emotion."
        );
        match output.widget {
            Some(Widget::Product(widget)) => assert_eq!(widget.status, "OPTIMAL"),
            other => panic!("expected product widget, got {:?}", other),
        }
    }

    #[test]
    fn test_execute_unknown_query_type_returns_full_record() {
        let output = ProductDatabaseTool::new()
            .execute(&args("loom", "everything"))
            .unwrap();
        assert_eq!(output.payload["status"], "DEPLOYED (v5.0 Full Spec)");
        assert!(output.payload.get("philosophy").is_some());
    }

    #[test]
    fn test_execute_not_found_is_payload_without_widget() {
        let output = ProductDatabaseTool::new()
            .execute(&args("toaster", "status"))
            .unwrap();
        assert!(output.is_error());
        assert_eq!(output.payload["error"], PRODUCT_NOT_FOUND);
        assert!(output.widget.is_none());
    }

    #[test]
    fn test_execute_missing_product_id_is_error() {
        let result = ProductDatabaseTool::new().execute(&Map::new());
        assert!(result.is_err());
    }
}
