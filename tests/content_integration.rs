//! Integration tests for the daily content pipeline
//!
//! Uses a scripted gateway, an in-memory store and a clock pinned to
//! 2026-02-01 so cache keys are deterministic.

mod common;

use astrai::content::{DeepInsight, Locale, PostPatch};
use astrai::error::AstraiError;
use astrai::providers::GenerationTool;
use astrai::resilience::ErrorClass;
use astrai::storage::KeyValueStore;
use common::{content_service, feb_first, ScriptedGateway, THREE_POSTS};
use std::sync::Arc;

const INSIGHT: &str =
    r#"{"logic": "Capital follows compute.", "trends": ["a", "b", "c"], "prediction": "Consolidation."}"#;

#[tokio::test]
async fn test_cache_miss_then_hit() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_generate(Ok(THREE_POSTS.to_string()));
    let (service, store) = content_service(gateway.clone(), 0);

    let first = service.daily_posts(Locale::En).await.unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first[0].id, "SIGNAL_20260201_01");
    assert_eq!(first[2].id, "SIGNAL_20260201_03");
    assert!(first.iter().all(|p| p.is_ai_generated));

    let second = service.daily_posts(Locale::En).await.unwrap();
    assert_eq!(first, second);

    let requests = gateway.generate_requests();
    assert_eq!(requests.len(), 1, "second read must be served from cache");
    assert_eq!(requests[0].tools, vec![GenerationTool::SearchGrounding]);
    assert!(store
        .get("astrai_daily_news_2026-02-01_en")
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_locales_are_cached_separately() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_generate(Ok(THREE_POSTS.to_string()));
    gateway.push_generate(Ok(THREE_POSTS.to_string()));
    let (service, store) = content_service(gateway.clone(), 0);

    service.daily_posts(Locale::En).await.unwrap();
    service.daily_posts(Locale::ZhTw).await.unwrap();

    assert_eq!(gateway.generate_requests().len(), 2);
    assert!(store
        .get("astrai_daily_news_2026-02-01_zh-TW")
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_transport_failure_is_retried_then_classified() {
    let gateway = Arc::new(ScriptedGateway::default());
    for _ in 0..3 {
        gateway.push_generate(Err(AstraiError::Gateway(
            "Rpc failed with 503 Service Unavailable: UNAVAILABLE".to_string(),
        )
        .into()));
    }
    let (service, store) = content_service(gateway.clone(), 2);

    let failure = service.daily_posts(Locale::En).await.unwrap_err();
    assert_eq!(failure.class, ErrorClass::SignalTurbulence);
    assert!(!failure.requires_reauthentication());
    assert_eq!(gateway.generate_requests().len(), 3);
    assert!(store.is_empty(), "failures must not be cached");
}

#[tokio::test]
async fn test_retry_recovers_from_transient_failure() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_generate(Err(AstraiError::Gateway("Rpc transport failure: reset".to_string()).into()));
    gateway.push_generate(Ok(THREE_POSTS.to_string()));
    let (service, _store) = content_service(gateway.clone(), 2);

    assert_eq!(service.daily_posts(Locale::En).await.unwrap().len(), 3);
    assert_eq!(gateway.generate_requests().len(), 2);
}

#[tokio::test]
async fn test_auth_failure_is_not_retried() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_generate(Err(AstraiError::Authentication(
        "API_KEY rejected (403 Forbidden)".to_string(),
    )
    .into()));
    let (service, _store) = content_service(gateway.clone(), 2);

    let failure = service.daily_posts(Locale::En).await.unwrap_err();
    assert_eq!(failure.class, ErrorClass::AuthRequired);
    assert!(failure.requires_reauthentication());
    assert_eq!(gateway.generate_requests().len(), 1);
}

#[tokio::test]
async fn test_malformed_output_is_core_halt_and_not_cached() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_generate(Ok("I could not find any news today.".to_string()));
    let (service, store) = content_service(gateway, 2);

    let failure = service.daily_posts(Locale::En).await.unwrap_err();
    assert_eq!(failure.class, ErrorClass::CoreHalt);
    assert!(failure.detail.contains("Neural Core Output Corrupted"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_empty_reply_is_not_retried() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_generate(Ok(String::new()));
    let (service, store) = content_service(gateway.clone(), 2);

    let failure = service.daily_posts(Locale::En).await.unwrap_err();
    assert_eq!(failure.class, ErrorClass::CoreHalt);
    assert_eq!(gateway.generate_requests().len(), 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_expand_post_preserves_sibling_posts_and_insight() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_generate(Ok(THREE_POSTS.to_string()));
    gateway.push_generate(Ok("## Full article\n\nThe routing trick explained.".to_string()));
    let (service, _store) = content_service(gateway.clone(), 0);

    let posts = service.daily_posts(Locale::En).await.unwrap();
    let insight = DeepInsight {
        logic: "l".to_string(),
        trends: vec!["t".to_string()],
        prediction: "p".to_string(),
    };
    service
        .cache()
        .set_insight(feb_first(), Locale::En, insight.clone())
        .unwrap();

    let expanded = service
        .expand_post(Locale::En, "SIGNAL_20260201_02")
        .await
        .unwrap();
    assert!(expanded.content.as_deref().unwrap().contains("routing trick"));

    let entry = service.cache().get(feb_first(), Locale::En).unwrap().unwrap();
    assert_eq!(entry.posts[0], posts[0]);
    assert_eq!(entry.posts[2], posts[2]);
    assert_eq!(entry.posts[1].title, posts[1].title);
    assert_eq!(entry.insight, Some(insight));

    // A second read serves the stored article
    let again = service
        .expand_post(Locale::En, "SIGNAL_20260201_02")
        .await
        .unwrap();
    assert_eq!(again, expanded);
    assert_eq!(gateway.generate_requests().len(), 2);
}

#[tokio::test]
async fn test_expand_unknown_post_is_core_halt() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_generate(Ok(THREE_POSTS.to_string()));
    let (service, _store) = content_service(gateway, 0);

    let failure = service
        .expand_post(Locale::En, "SIGNAL_20260201_09")
        .await
        .unwrap_err();
    assert_eq!(failure.class, ErrorClass::CoreHalt);
}

#[tokio::test]
async fn test_deep_insight_falls_back_to_secondary_model() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_generate(Ok(THREE_POSTS.to_string()));
    gateway.push_generate(Err(AstraiError::Gateway("Rpc failed with 503".to_string()).into()));
    gateway.push_generate(Ok(INSIGHT.to_string()));
    let (service, _store) = content_service(gateway.clone(), 0);

    let insight = service.deep_insight(Locale::En).await.unwrap();
    assert_eq!(insight.trends.len(), 3);

    let models: Vec<String> = gateway
        .generate_requests()
        .into_iter()
        .map(|r| r.model)
        .collect();
    assert_eq!(
        models,
        vec!["gemini-2.5-flash", "gemini-2.5-pro", "gemini-2.5-flash"]
    );

    let entry = service.cache().get(feb_first(), Locale::En).unwrap().unwrap();
    assert_eq!(entry.insight, Some(insight.clone()));
    assert_eq!(entry.posts.len(), 3);

    // Cached insight needs no further calls
    assert_eq!(service.deep_insight(Locale::En).await.unwrap(), insight);
    assert_eq!(gateway.generate_requests().len(), 3);
}

#[tokio::test]
async fn test_merge_post_on_missing_entry_is_noop() {
    let gateway = Arc::new(ScriptedGateway::default());
    let (service, store) = content_service(gateway, 0);

    let merged = service
        .cache()
        .merge_post(
            feb_first(),
            Locale::En,
            "SIGNAL_20260201_01",
            &PostPatch::content("x"),
        )
        .unwrap();
    assert!(merged.is_none());
    assert!(store.is_empty());
}
