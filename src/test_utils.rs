//! Test utilities for Astrai
//!
//! Provides a scripted model gateway that replays queued replies and
//! records every request it receives.

use crate::error::{AstraiError, Result};
use crate::providers::{ConverseRequest, GenerateRequest, ModelGateway, ModelReply};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Gateway returning queued replies in order
///
/// An exhausted queue yields a `Gateway` error.
#[derive(Default)]
pub struct ScriptedGateway {
    converse_replies: Mutex<VecDeque<Result<ModelReply>>>,
    generate_replies: Mutex<VecDeque<Result<String>>>,
    converse_requests: Mutex<Vec<ConverseRequest>>,
    generate_requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

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
        self.converse_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AstraiError::Gateway("converse script exhausted".to_string()).into()))
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        self.generate_requests.lock().unwrap().push(request.clone());
        self.generate_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AstraiError::Gateway("generate script exhausted".to_string()).into()))
    }
}
