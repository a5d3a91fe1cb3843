//! Gemini REST gateway
//!
//! Implements [`ModelGateway`] against the `generateContent` endpoint of the
//! Gemini API. Conversational rounds are sent statelessly: every round
//! replays the full turn list, including previous function calls and their
//! responses.

use crate::config::GatewayConfig;
use crate::error::{AstraiError, Result};
use crate::providers::{
    ConverseRequest, GenerateRequest, GenerationTool, ModelGateway, ModelReply, ToolCall, Turn,
};
use crate::tools::ToolDeclaration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

/// Gemini API gateway
///
/// # Examples
///
/// ```
/// use astrai::config::GatewayConfig;
/// use astrai::providers::GeminiGateway;
///
/// let config = GatewayConfig {
///     api_key: Some("test-key".to_string()),
///     ..Default::default()
/// };
/// let gateway = GeminiGateway::new(&config);
/// assert!(gateway.is_ok());
/// ```
pub struct GeminiGateway {
    client: Client,
    api_base: Url,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn new(role: &str, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<WireFunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    response: Value,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    function_declarations: Option<Vec<WireFunctionDeclaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_search: Option<Value>,
}

#[derive(Debug, Serialize)]
struct WireFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

impl GeminiGateway {
    /// Create a new gateway from configuration
    ///
    /// # Errors
    ///
    /// Returns `AstraiError::MissingCredentials` when no API key is
    /// configured, and `AstraiError::Config` when the API base is not a
    /// valid URL or the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AstraiError::MissingCredentials(
                    "API_KEY is not configured (set GEMINI_API_KEY or API_KEY)".to_string(),
                )
            })?
            .to_string();

        let api_base = Url::parse(&config.api_base).map_err(|e| {
            AstraiError::Config(format!("Invalid gateway api_base {}: {}", config.api_base, e))
        })?;

        let mut builder = Client::builder().user_agent("astrai/0.3.0");
        if let Some(seconds) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| AstraiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Gemini gateway: api_base={}", api_base);

        Ok(Self {
            client,
            api_base,
            api_key,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.as_str().trim_end_matches('/'),
            model
        )
    }

    async fn send(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model);
        tracing::debug!(
            "Sending Gemini request: model={}, {} contents, {} tools",
            model,
            body.contents.len(),
            body.tools.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                AstraiError::Gateway(format!("Rpc transport failure: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(map_http_error(status, &error_text).into());
        }

        response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            AstraiError::Gateway(format!("Failed to decode Gemini response: {}", e)).into()
        })
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn converse(&self, request: &ConverseRequest) -> Result<ModelReply> {
        let body = GenerateContentRequest {
            contents: convert_turns(&request.turns),
            system_instruction: if request.system_prompt.is_empty() {
                None
            } else {
                Some(Content {
                    role: None,
                    parts: vec![Part::text(request.system_prompt.clone())],
                })
            },
            tools: convert_declarations(&request.tools),
        };

        let response = self.send(&request.model, &body).await?;
        let reply = convert_reply(response);
        tracing::debug!(
            "Gemini reply: text={}, tool_calls={}",
            reply.text.is_some(),
            reply.tool_calls.len()
        );
        Ok(reply)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let tools = request
            .tools
            .iter()
            .map(|tool| match tool {
                GenerationTool::SearchGrounding => WireTool {
                    google_search: Some(Value::Object(Map::new())),
                    ..Default::default()
                },
            })
            .collect();

        let body = GenerateContentRequest {
            contents: vec![Content::new("user", vec![Part::text(request.prompt.clone())])],
            system_instruction: None,
            tools,
        };

        let response = self.send(&request.model, &body).await?;
        convert_reply(response)
            .text
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                AstraiError::MalformedOutput("Empty response from Neural Core".to_string()).into()
            })
    }
}

fn convert_turns(turns: &[Turn]) -> Vec<Content> {
    turns
        .iter()
        .map(|turn| match turn {
            Turn::User(text) => Content::new("user", vec![Part::text(text.clone())]),
            Turn::Model(text) => Content::new("model", vec![Part::text(text.clone())]),
            Turn::ToolCalls(calls) => Content::new(
                "model",
                calls
                    .iter()
                    .map(|call| Part {
                        function_call: Some(WireFunctionCall {
                            id: Some(call.id.clone()),
                            name: call.name.clone(),
                            args: call.args.clone(),
                        }),
                        thought_signature: call.thought_signature.clone(),
                        ..Default::default()
                    })
                    .collect(),
            ),
            Turn::ToolResults(results) => Content::new(
                "user",
                results
                    .iter()
                    .map(|result| Part {
                        function_response: Some(WireFunctionResponse {
                            id: Some(result.id.clone()),
                            name: result.name.clone(),
                            response: as_response_object(&result.response),
                        }),
                        ..Default::default()
                    })
                    .collect(),
            ),
        })
        .collect()
}

/// Function responses must be JSON objects on the wire
fn as_response_object(payload: &Value) -> Value {
    match payload {
        Value::Object(_) => payload.clone(),
        other => serde_json::json!({ "result": other }),
    }
}

fn convert_declarations(tools: &[ToolDeclaration]) -> Vec<WireTool> {
    if tools.is_empty() {
        return Vec::new();
    }
    vec![WireTool {
        function_declarations: Some(
            tools
                .iter()
                .map(|tool| WireFunctionDeclaration {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                })
                .collect(),
        ),
        ..Default::default()
    }]
}

fn convert_reply(response: GenerateContentResponse) -> ModelReply {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    for (idx, part) in parts.into_iter().enumerate() {
        if let Some(text) = part.text {
            texts.push(text);
        }
        if let Some(call) = part.function_call {
            let id = call.id.filter(|id| !id.is_empty()).unwrap_or_else(|| {
                format!("call_{}_{}", chrono::Utc::now().timestamp_millis(), idx)
            });
            tool_calls.push(
                ToolCall::new(id, call.name, call.args)
                    .with_thought_signature(part.thought_signature),
            );
        }
    }

    ModelReply {
        text: if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        },
        tool_calls,
    }
}

fn map_http_error(status: StatusCode, body: &str) -> AstraiError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{}: {}", status_text, msg)
            }
        })
        .unwrap_or_else(|_| body.to_string());

    let key_rejected = body.contains("API_KEY") || body.to_lowercase().contains("api key");
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) || key_rejected {
        return AstraiError::Authentication(format!("API_KEY rejected ({}): {}", status, message));
    }

    let transient = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );
    if transient {
        AstraiError::Gateway(format!("Rpc failed with {}: {}", status, message))
    } else {
        AstraiError::Gateway(format!("Request rejected with {}: {}", status, message))
    }
}
