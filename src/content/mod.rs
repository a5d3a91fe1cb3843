//! Daily generated content
//!
//! A date and locale keyed cache of AI-generated posts and the pipeline
//! that fills and enriches it.

pub mod cache;
pub mod service;
pub mod types;

pub use cache::DailyContentCache;
pub use service::{
    parse_daily_posts, parse_insight, Clock, ContentFailure, DailyContentService, FixedClock,
    SystemClock,
};
pub use types::{CacheEntry, CacheKey, DeepInsight, GeneratedPost, Locale, PostPatch};
