//! Failure handling for the content pipeline
//!
//! Retry with backoff, model fallback, and heuristic classification of
//! gateway failures.

pub mod classifier;
pub mod retry;

pub use classifier::{ErrorClass, ErrorClassifier};
pub use retry::{with_fallback_model, with_retry, with_retry_if, Backoff, RetryPolicy};
