//! Daily content pipeline
//!
//! Cache lookup, search-grounded generation with retry, parsing, and the
//! two incremental enrichments: lazy article backfill and the deep insight.
//! Every public operation fixes the calendar date once at its start, so a
//! date rollover mid-operation never writes to a different key.

use crate::config::ContentConfig;
use crate::content::cache::DailyContentCache;
use crate::content::types::{CacheEntry, DeepInsight, GeneratedPost, Locale, PostPatch};
use crate::error::{AstraiError, Result};
use crate::prompts;
use crate::providers::{GenerateRequest, GenerationTool, ModelGateway};
use crate::resilience::{with_fallback_model, with_retry_if, ErrorClass, ErrorClassifier};
use anyhow::Context;
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Source of the process-local calendar date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Page-level failure of a content operation
#[derive(Debug, Clone, Error)]
#[error("{class}: {detail}")]
pub struct ContentFailure {
    pub class: ErrorClass,
    pub detail: String,
}

impl ContentFailure {
    /// True only when re-authentication can resolve the failure
    pub fn requires_reauthentication(&self) -> bool {
        self.class == ErrorClass::AuthRequired
    }
}

#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(default)]
    title: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    date: Option<String>,
}

/// Produces, caches and enriches the daily generated content
pub struct DailyContentService {
    gateway: Arc<dyn ModelGateway>,
    cache: Arc<DailyContentCache>,
    config: ContentConfig,
    clock: Arc<dyn Clock>,
    classifier: Arc<ErrorClassifier>,
}

impl DailyContentService {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        cache: Arc<DailyContentCache>,
        config: ContentConfig,
    ) -> Self {
        Self {
            gateway,
            cache,
            config,
            clock: Arc::new(SystemClock),
            classifier: Arc::new(ErrorClassifier::default()),
        }
    }

    /// Replace the date source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the failure classifier
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn cache(&self) -> &DailyContentCache {
        &self.cache
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Today's posts for `locale`, generated on a cache miss
    ///
    /// # Errors
    ///
    /// Returns a classified [`ContentFailure`] if generation fails after
    /// retries or the output is malformed.
    pub async fn daily_posts(
        &self,
        locale: Locale,
    ) -> std::result::Result<Vec<GeneratedPost>, ContentFailure> {
        let date = self.clock.today();
        self.load_or_fetch(date, locale)
            .await
            .map(|entry| entry.posts)
            .map_err(|e| self.failure("daily news", e))
    }

    /// Today's deep insight for `locale`
    ///
    /// Posts are fetched first if needed. The insight is generated with
    /// retry around a primary-then-fallback model attempt and merged into
    /// the cached entry without touching its posts.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ContentFailure`]
    pub async fn deep_insight(
        &self,
        locale: Locale,
    ) -> std::result::Result<DeepInsight, ContentFailure> {
        let date = self.clock.today();
        self.load_or_generate_insight(date, locale)
            .await
            .map_err(|e| self.failure("deep insight", e))
    }

    /// Post `post_id` with its full article, generated on first request
    ///
    /// Posts that are not AI-generated or already expanded are returned
    /// without a network call.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ContentFailure`]; an unknown id is a
    /// `CORE_HALT` failure.
    pub async fn expand_post(
        &self,
        locale: Locale,
        post_id: &str,
    ) -> std::result::Result<GeneratedPost, ContentFailure> {
        let date = self.clock.today();
        self.load_or_expand(date, locale, post_id)
            .await
            .map_err(|e| self.failure("article backfill", e))
    }

    async fn load_or_fetch(&self, date: NaiveDate, locale: Locale) -> Result<CacheEntry> {
        let key = self.cache.key(date, locale);
        if let Some(entry) = self.cache.get(date, locale)? {
            tracing::info!("Content cache hit: {}", key);
            return Ok(entry);
        }

        tracing::info!("Content cache miss: {}; fetching daily signals", key);
        let prompt = prompts::daily_news_prompt(locale);
        let text = self
            .generate(
                &self.config.news_model,
                &prompt,
                &[GenerationTool::SearchGrounding],
            )
            .await?;
        let posts = parse_daily_posts(&text, date)?;

        let entry = CacheEntry::new(posts);
        self.cache
            .put(date, locale, &entry)
            .with_context(|| format!("Failed to store daily signals under {}", key))?;
        tracing::info!("Stored {} posts under {}", entry.posts.len(), key);
        Ok(entry)
    }

    async fn load_or_generate_insight(&self, date: NaiveDate, locale: Locale) -> Result<DeepInsight> {
        let entry = self.load_or_fetch(date, locale).await?;
        if let Some(insight) = entry.insight {
            return Ok(insight);
        }

        let prompt = prompts::insight_prompt(locale, &entry.posts);
        let prompt = prompt.as_str();
        let primary = self.config.insight_model.as_str();
        let secondary = self.config.insight_fallback_model.as_str();
        let this = self;

        let text = with_retry_if(
            &self.config.retry,
            move || {
                with_fallback_model(primary, secondary, move |model| async move {
                    this.generate_once(&model, prompt, &[]).await
                })
            },
            |e| self.is_retryable(e),
        )
        .await?;

        let insight = parse_insight(&text)?;
        if self.cache.set_insight(date, locale, insight.clone())?.is_none() {
            tracing::warn!("Cache entry for {} vanished before the insight was stored", date);
        }
        Ok(insight)
    }

    async fn load_or_expand(
        &self,
        date: NaiveDate,
        locale: Locale,
        post_id: &str,
    ) -> Result<GeneratedPost> {
        let entry = self.load_or_fetch(date, locale).await?;
        let post = entry
            .post(post_id)
            .cloned()
            .ok_or_else(|| AstraiError::Storage(format!("Post {} not found", post_id)))?;

        if !post.needs_expansion() {
            return Ok(post);
        }

        tracing::info!("Generating full article for {}", post_id);
        let prompt = prompts::article_prompt(locale, &post);
        let content = self.generate(&self.config.article_model, &prompt, &[]).await?;
        let patch = PostPatch::content(content);

        match self.cache.merge_post(date, locale, post_id, &patch)? {
            Some(stored) => stored
                .post(post_id)
                .cloned()
                .ok_or_else(|| AstraiError::Storage(format!("Post {} not found", post_id)).into()),
            None => {
                tracing::warn!("Post {} no longer cached; returning unsaved article", post_id);
                Ok(patch.apply(&post))
            }
        }
    }

    /// One generation call wrapped in the configured retry policy
    async fn generate(&self, model: &str, prompt: &str, tools: &[GenerationTool]) -> Result<String> {
        with_retry_if(
            &self.config.retry,
            || self.generate_once(model, prompt, tools),
            |e| self.is_retryable(e),
        )
        .await
    }

    async fn generate_once(&self, model: &str, prompt: &str, tools: &[GenerationTool]) -> Result<String> {
        let request = tools
            .iter()
            .fold(GenerateRequest::new(model, prompt), |request, tool| {
                request.with_tool(*tool)
            });
        let text = self.gateway.generate(&request).await?;
        if text.trim().is_empty() {
            return Err(AstraiError::MalformedOutput("Empty response from Neural Core".to_string()).into());
        }
        Ok(text)
    }

    /// Authentication failures are never retried
    /// Credential problems and unusable model output are final
    fn is_retryable(&self, error: &anyhow::Error) -> bool {
        if matches!(
            error.downcast_ref::<AstraiError>(),
            Some(AstraiError::MalformedOutput(_))
        ) {
            return false;
        }
        self.classifier.classify(error) != ErrorClass::AuthRequired
    }

    fn failure(&self, operation: &str, error: anyhow::Error) -> ContentFailure {
        let class = self.classifier.classify(&error);
        tracing::error!("{} failed ({}): {:#}", operation, class, error);
        ContentFailure {
            class,
            detail: format!("{:#}", error),
        }
    }
}

/// Remove markdown code fences around a JSON payload
fn strip_fences(text: &str) -> Result<String> {
    let fences = Regex::new(r"```(?:json)?\n?|\n?```")?;
    Ok(fences.replace_all(text, "").trim().to_string())
}

fn parse_json(text: &str) -> Result<Value> {
    let cleaned = strip_fences(text)?;
    if cleaned.is_empty() {
        return Err(AstraiError::MalformedOutput("Empty response from Neural Core".to_string()).into());
    }
    serde_json::from_str(&cleaned).map_err(|e| {
        tracing::error!("Failed to parse model output: {}", e);
        AstraiError::MalformedOutput("Neural Core Output Corrupted".to_string()).into()
    })
}

/// Parse the daily news reply into posts dated `date`
///
/// Ids are `SIGNAL_{YYYYMMDD}_0{n}` with `n` starting at 1.
pub fn parse_daily_posts(text: &str, date: NaiveDate) -> Result<Vec<GeneratedPost>> {
    let Value::Array(items) = parse_json(text)? else {
        return Err(AstraiError::MalformedOutput("Invalid Data Structure".to_string()).into());
    };

    let stamp = date.format("%Y%m%d").to_string();
    let display_date = date.format("%Y.%m.%d").to_string();

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| -> Result<GeneratedPost> {
            if !item.is_object() {
                return Err(AstraiError::MalformedOutput("Invalid Data Structure".to_string()).into());
            }
            let raw: RawPost = serde_json::from_value(item)
                .map_err(|_| AstraiError::MalformedOutput("Invalid Data Structure".to_string()))?;
            Ok(GeneratedPost {
                id: format!("SIGNAL_{}_0{}", stamp, index + 1),
                date: raw.date.unwrap_or_else(|| display_date.clone()),
                title: raw.title,
                category: raw.category,
                excerpt: raw.excerpt,
                content: None,
                is_ai_generated: true,
            })
        })
        .collect()
}

/// Parse the deep insight reply
pub fn parse_insight(text: &str) -> Result<DeepInsight> {
    let value = parse_json(text)?;
    if !value.is_object() {
        return Err(AstraiError::MalformedOutput("Invalid Data Structure".to_string()).into());
    }
    serde_json::from_value(value)
        .map_err(|_| AstraiError::MalformedOutput("Invalid Data Structure".to_string()).into())
}
