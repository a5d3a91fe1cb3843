//! Data types of the daily content cache

use crate::error::{AstraiError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display locale of generated content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "zh-tw" | "zh-hant" | "zh" => Ok(Locale::ZhTw),
            other => Err(AstraiError::Config(format!(
                "Unsupported locale: {} (expected en or zh-TW)",
                other
            ))
            .into()),
        }
    }
}

/// Storage key of one day's content for one locale
///
/// Renders as `{namespace}_{YYYY-MM-DD}_{locale}`.
///
/// # Examples
///
/// ```
/// use astrai::content::{CacheKey, Locale};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
/// let key = CacheKey::new("astrai_daily_news", date, Locale::ZhTw);
/// assert_eq!(key.to_string(), "astrai_daily_news_2026-02-01_zh-TW");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub namespace: String,
    pub date: NaiveDate,
    pub locale: Locale,
}

impl CacheKey {
    pub fn new(namespace: impl Into<String>, date: NaiveDate, locale: Locale) -> Self {
        Self {
            namespace: namespace.into(),
            date,
            locale,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.namespace,
            self.date.format("%Y-%m-%d"),
            self.locale
        )
    }
}

/// One AI-generated observation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPost {
    pub id: String,
    pub date: String,
    pub title: String,
    pub category: String,
    pub excerpt: String,
    /// Full article, filled in lazily
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "isAIGenerated", default)]
    pub is_ai_generated: bool,
}

impl GeneratedPost {
    /// Returns true if the full article still has to be generated
    pub fn needs_expansion(&self) -> bool {
        self.is_ai_generated && self.content.as_deref().map_or(true, |c| c.trim().is_empty())
    }
}

/// Analysis derived from the day's posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepInsight {
    pub logic: String,
    /// Ordered trend statements, normally three
    pub trends: Vec<String>,
    pub prediction: String,
}

/// Everything cached for one (date, locale) pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub posts: Vec<GeneratedPost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<DeepInsight>,
}

impl CacheEntry {
    pub fn new(posts: Vec<GeneratedPost>) -> Self {
        Self {
            posts,
            insight: None,
        }
    }

    pub fn post(&self, id: &str) -> Option<&GeneratedPost> {
        self.posts.iter().find(|p| p.id == id)
    }
}

/// Field-level update applied to one post
///
/// An unset body leaves the stored one untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub content: Option<String>,
}

impl PostPatch {
    /// Patch that only backfills the article body
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }

    /// Return a patched copy of `post`
    pub fn apply(&self, post: &GeneratedPost) -> GeneratedPost {
        GeneratedPost {
            content: self.content.clone().or_else(|| post.content.clone()),
            ..post.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post() -> GeneratedPost {
        GeneratedPost {
            id: "SIGNAL_20260201_01".to_string(),
            date: "2026.02.01".to_string(),
            title: "t".to_string(),
            category: "c".to_string(),
            excerpt: "e".to_string(),
            content: None,
            is_ai_generated: true,
        }
    }

    #[test]
    fn test_locale_parse_and_display() {
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("zh-TW".parse::<Locale>().unwrap(), Locale::ZhTw);
        assert_eq!("zh_tw".parse::<Locale>().unwrap(), Locale::ZhTw);
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!(Locale::ZhTw.to_string(), "zh-TW");
    }

    #[test]
    fn test_locale_serde_names() {
        assert_eq!(serde_json::to_value(Locale::ZhTw).unwrap(), json!("zh-TW"));
        let locale: Locale = serde_json::from_value(json!("en")).unwrap();
        assert_eq!(locale, Locale::En);
    }

    #[test]
    fn test_cache_key_changes_with_date_and_locale() {
        let d1 = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let a = CacheKey::new("ns", d1, Locale::En).to_string();
        assert_eq!(a, "ns_2026-02-01_en");
        assert_ne!(a, CacheKey::new("ns", d2, Locale::En).to_string());
        assert_ne!(a, CacheKey::new("ns", d1, Locale::ZhTw).to_string());
    }

    #[test]
    fn test_generated_post_wire_names() {
        let value = serde_json::to_value(post()).unwrap();
        assert_eq!(value["isAIGenerated"], true);
        assert!(value.get("content").is_none());
    }

    #[test]
    fn test_needs_expansion() {
        let mut p = post();
        assert!(p.needs_expansion());
        p.content = Some("body".to_string());
        assert!(!p.needs_expansion());
        p.content = None;
        p.is_ai_generated = false;
        assert!(!p.needs_expansion());
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let patched = PostPatch::content("full").apply(&post());
        assert_eq!(patched.content.as_deref(), Some("full"));
        assert_eq!(patched.title, "t");
        assert_eq!(patched.id, "SIGNAL_20260201_01");
    }

    #[test]
    fn test_empty_patch_keeps_existing_body() {
        let mut original = post();
        original.content = Some("kept".to_string());
        assert_eq!(PostPatch::default().apply(&original), original);
    }

    #[test]
    fn test_cache_entry_without_insight_deserializes() {
        let entry: CacheEntry = serde_json::from_value(json!({"posts": []})).unwrap();
        assert!(entry.insight.is_none());
    }
}
