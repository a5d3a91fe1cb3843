use astrai::config::ContentConfig;
use astrai::content::{DailyContentCache, DailyContentService, FixedClock};
use astrai::error::{AstraiError, Result};
use astrai::providers::{ConverseRequest, GenerateRequest, ModelGateway, ModelReply};
use astrai::resilience::{Backoff, RetryPolicy};
use astrai::storage::{KeyValueStore, MemoryStore};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Gateway replaying queued replies and recording requests
#[derive(Default)]
pub struct ScriptedGateway {
    converse_replies: Mutex<VecDeque<Result<ModelReply>>>,
    generate_replies: Mutex<VecDeque<Result<String>>>,
    converse_requests: Mutex<Vec<ConverseRequest>>,
    generate_requests: Mutex<Vec<GenerateRequest>>,
}

#[allow(dead_code)]
impl ScriptedGateway {
    pub fn push_converse(&self, reply: Result<ModelReply>) {
        self.converse_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_generate(&self, reply: Result<String>) {
        self.generate_replies.lock().unwrap().push_back(reply);
    }

    pub fn converse_requests(&self) -> Vec<ConverseRequest> {
        self.converse_requests.lock().unwrap().clone()
    }

    pub fn generate_requests(&self) -> Vec<GenerateRequest> {
        self.generate_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn converse(&self, request: &ConverseRequest) -> Result<ModelReply> {
        self.converse_requests.lock().unwrap().push(request.clone());
        let next = self.converse_replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(AstraiError::Gateway("script exhausted".to_string()).into()))
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        self.generate_requests.lock().unwrap().push(request.clone());
        let next = self.generate_replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(AstraiError::Gateway("script exhausted".to_string()).into()))
    }
}

/// Gateway whose `converse` waits until released
#[allow(dead_code)]
#[derive(Default)]
pub struct BlockingGateway {
    pub release: Notify,
}

#[async_trait]
impl ModelGateway for BlockingGateway {
    async fn converse(&self, _request: &ConverseRequest) -> Result<ModelReply> {
        self.release.notified().await;
        Ok(ModelReply::text("released"))
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<String> {
        Ok(String::new())
    }
}

#[allow(dead_code)]
pub fn feb_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
}

/// Retry policy without waiting between attempts
#[allow(dead_code)]
pub fn instant_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay_ms: 1,
        backoff: Backoff::Linear,
    }
}

/// Content service on an in-memory store pinned to 2026-02-01
#[allow(dead_code)]
pub fn content_service(
    gateway: Arc<ScriptedGateway>,
    max_retries: u32,
) -> (DailyContentService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = ContentConfig {
        retry: instant_retry(max_retries),
        ..ContentConfig::default()
    };
    let cache = Arc::new(DailyContentCache::new(
        store.clone() as Arc<dyn KeyValueStore>,
        config.namespace.clone(),
    ));
    let service = DailyContentService::new(gateway, cache, config)
        .with_clock(Arc::new(FixedClock(feb_first())));
    (service, store)
}

#[allow(dead_code)]
pub const THREE_POSTS: &str = r#"```json
[
  {"title": "Compute Cartels Form", "excerpt": "Three labs pool clusters.", "category": "Compute War", "date": "2026.02.01"},
  {"title": "Sparse Minds", "excerpt": "A new routing trick.", "category": "Tech Breakthrough", "date": "2026.02.01"},
  {"title": "Silicon Treaty", "excerpt": "Export rules tighten.", "category": "Geopolitics", "date": "2026.02.01"}
]
```"#;
