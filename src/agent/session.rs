//! Conversation session with local tool dispatch
//!
//! A session mediates between the user and the model gateway:
//!
//! - One exchange at a time; `send` while busy is a no-op
//! - Tool calls from the first round are executed locally and every call
//!   is answered with exactly one result in the second round
//! - The first non-error tool output carrying a widget decorates the reply
//! - Deferred commands from resolvers are dispatched here, never by the
//!   registry
//! - Gateway failures end the turn with a transient error notice; the
//!   session stays usable and nothing is retried

use crate::agent::message::{ChatMessage, Role};
use crate::config::ChatConfig;
use crate::content::Locale;
use crate::prompts;
use crate::providers::{ConverseRequest, ModelGateway, ToolCall, ToolResult, Turn};
use crate::tools::{DeferredCommand, ToolRegistry, Widget};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Reply used when the second round carries no text
pub const TOOL_REPLY_FALLBACK: &str = "Data retrieved. Processing...";
/// Reply used when a plain round carries no text
pub const EMPTY_REPLY_FALLBACK: &str = "Signal lost...";
/// Notice appended when the gateway fails
pub const CONNECTION_SEVERED: &str = "ERROR: Connection severed. Neural overload.";

/// Turn state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
    ToolsPending,
    Executing,
}

/// Command for the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Navigate { path: String },
}

/// Result of one `send`
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Blank input, or another exchange was in flight
    Ignored,
    /// The model answered; the reply was appended to history
    Replied(ChatMessage),
    /// The exchange failed; the error notice was appended to history
    Failed(ChatMessage),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Returns the session to `Idle` and schedules the tool indicator reset
/// however the turn ends
///
/// The reset only applies while no later turn has started.
struct TurnGuard<'a> {
    state: &'a Mutex<SessionState>,
    tool_active: Arc<AtomicBool>,
    turns: Arc<AtomicU64>,
    turn: u64,
    cooldown: Duration,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        *lock(self.state) = SessionState::Idle;

        let flag = Arc::clone(&self.tool_active);
        let turns = Arc::clone(&self.turns);
        let turn = self.turn;
        let cooldown = self.cooldown;
        let reset = move || {
            if turns.load(Ordering::SeqCst) == turn {
                flag.store(false, Ordering::SeqCst);
            }
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(cooldown).await;
                    reset();
                });
            }
            Err(_) => reset(),
        }
    }
}

struct ToolRound {
    calls: Vec<ToolCall>,
    results: Vec<ToolResult>,
    widget: Option<Widget>,
}

/// One user-visible chat
pub struct ConversationSession {
    gateway: Arc<dyn ModelGateway>,
    tools: Arc<ToolRegistry>,
    config: ChatConfig,
    system_prompt: String,
    state: Mutex<SessionState>,
    history: Mutex<Vec<ChatMessage>>,
    tool_active: Arc<AtomicBool>,
    turns: Arc<AtomicU64>,
    ui: Option<UnboundedSender<UiCommand>>,
}

impl ConversationSession {
    /// Create a session greeting the user in `locale`
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        tools: Arc<ToolRegistry>,
        config: ChatConfig,
        locale: Locale,
    ) -> Self {
        Self {
            gateway,
            tools,
            config,
            system_prompt: prompts::build_system_prompt(locale),
            state: Mutex::new(SessionState::Idle),
            history: Mutex::new(vec![ChatMessage::notice(prompts::greeting(locale))]),
            tool_active: Arc::new(AtomicBool::new(false)),
            turns: Arc::new(AtomicU64::new(0)),
            ui: None,
        }
    }

    /// Route deferred UI commands to `sender`
    pub fn with_ui_channel(mut self, sender: UnboundedSender<UiCommand>) -> Self {
        self.ui = Some(sender);
        self
    }

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        lock(&self.history).clone()
    }

    /// True while tools run and for the cool-down after the turn
    pub fn is_tool_active(&self) -> bool {
        self.tool_active.load(Ordering::SeqCst)
    }

    /// Shared handle to the tool indicator for UI polling
    pub fn tool_activity(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.tool_active)
    }

    /// Send one user message and run the exchange to completion
    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let Some(_guard) = self.begin_turn() else {
            debug!("Exchange already in flight; ignoring input");
            return SendOutcome::Ignored;
        };

        self.append(ChatMessage::user(text));
        let turns = self.replay_turns();
        info!("Sending turn ({} replayed entries)", turns.len());

        match self.exchange(turns).await {
            Ok(reply) => {
                self.append(reply.clone());
                SendOutcome::Replied(reply)
            }
            Err(e) => {
                warn!("Exchange failed: {:#}", e);
                let notice = ChatMessage::notice(CONNECTION_SEVERED);
                self.append(notice.clone());
                SendOutcome::Failed(notice)
            }
        }
    }

    fn begin_turn(&self) -> Option<TurnGuard<'_>> {
        let mut state = lock(&self.state);
        if *state != SessionState::Idle {
            return None;
        }
        *state = SessionState::Sending;
        let turn = self.turns.fetch_add(1, Ordering::SeqCst) + 1;
        self.tool_active.store(false, Ordering::SeqCst);
        Some(TurnGuard {
            state: &self.state,
            tool_active: Arc::clone(&self.tool_active),
            turns: Arc::clone(&self.turns),
            turn,
            cooldown: Duration::from_millis(self.config.tool_cooldown_ms),
        })
    }

    fn set_state(&self, next: SessionState) {
        *lock(&self.state) = next;
    }

    fn append(&self, message: ChatMessage) {
        lock(&self.history).push(message);
    }

    fn replay_turns(&self) -> Vec<Turn> {
        lock(&self.history)
            .iter()
            .filter(|m| !m.transient)
            .map(|m| match m.role {
                Role::User => Turn::User(m.text.clone()),
                Role::Model => Turn::Model(m.text.clone()),
            })
            .collect()
    }

    fn request(&self, turns: Vec<Turn>) -> ConverseRequest {
        ConverseRequest {
            model: self.config.model.clone(),
            system_prompt: self.system_prompt.clone(),
            tools: self.tools.declarations(),
            turns,
        }
    }

    async fn exchange(&self, mut turns: Vec<Turn>) -> crate::error::Result<ChatMessage> {
        let reply = self.gateway.converse(&self.request(turns.clone())).await?;

        if !reply.has_tool_calls() {
            let text = reply
                .text
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string());
            return Ok(ChatMessage::model(text));
        }

        self.set_state(SessionState::ToolsPending);
        let round = self.run_tools(reply.tool_calls);
        self.set_state(SessionState::Sending);

        turns.push(Turn::ToolCalls(round.calls));
        turns.push(Turn::ToolResults(round.results));
        let follow_up = self.gateway.converse(&self.request(turns)).await?;

        if follow_up.has_tool_calls() {
            warn!(
                "Ignoring {} tool calls in the second round",
                follow_up.tool_calls.len()
            );
        }
        let text = follow_up
            .text
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| TOOL_REPLY_FALLBACK.to_string());
        Ok(ChatMessage::model(text).with_widget(round.widget))
    }

    fn run_tools(&self, calls: Vec<ToolCall>) -> ToolRound {
        self.tool_active.store(true, Ordering::SeqCst);
        self.set_state(SessionState::Executing);
        debug!("Executing {} tool calls", calls.len());

        let mut results = Vec::with_capacity(calls.len());
        let mut widget: Option<Widget> = None;

        for call in &calls {
            let output = self.tools.execute(&call.name, &call.args);

            if !output.is_error() {
                if let Some(candidate) = output.widget {
                    match widget {
                        None => widget = Some(candidate),
                        Some(_) => debug!(
                            "Widget from {} ignored; first widget of the turn wins",
                            call.name
                        ),
                    }
                }
            }
            if let Some(command) = output.deferred {
                self.dispatch(command);
            }

            results.push(ToolResult {
                id: call.id.clone(),
                name: call.name.clone(),
                response: output.payload,
            });
        }

        ToolRound {
            calls,
            results,
            widget,
        }
    }

    /// Fire-and-forget; never delays the tool result
    fn dispatch(&self, command: DeferredCommand) {
        let Some(sender) = self.ui.clone() else {
            debug!("No UI channel; dropping {:?}", command);
            return;
        };
        match command {
            DeferredCommand::Navigate { path, delay } => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if sender.send(UiCommand::Navigate { path }).is_err() {
                        debug!("UI channel closed before navigation");
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ModelReply;
    use crate::test_utils::ScriptedGateway;
    use serde_json::{json, Map};

    fn config() -> ChatConfig {
        ChatConfig {
            tool_cooldown_ms: 0,
            navigation_delay_ms: 0,
            ..ChatConfig::default()
        }
    }

    fn session(gateway: Arc<ScriptedGateway>) -> ConversationSession {
        ConversationSession::new(
            gateway,
            Arc::new(ToolRegistry::with_defaults(Duration::ZERO)),
            config(),
            Locale::En,
        )
    }

    fn call(id: &str, name: &str, args: serde_json::Value) -> ToolCall {
        let args = match args {
            serde_json::Value::Object(map) => map,
            _ => Map::new(),
        };
        ToolCall::new(id, name, args)
    }

    #[tokio::test]
    async fn test_plain_reply_appends_model_message() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_converse(Ok(ModelReply::text("Greetings, biological.")));
        let session = session(gateway.clone());

        let outcome = session.send("hello").await;
        match outcome {
            SendOutcome::Replied(msg) => {
                assert_eq!(msg.text, "Greetings, biological.");
                assert!(msg.widget.is_none());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_greeting_is_not_replayed() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_converse(Ok(ModelReply::text("ok")));
        let session = session(gateway.clone());
        session.send("hello").await;

        let request = &gateway.converse_requests()[0];
        assert_eq!(request.turns, vec![Turn::User("hello".to_string())]);
        assert_eq!(request.tools.len(), 4);
        assert!(request.system_prompt.contains("Astrai"));
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let gateway = Arc::new(ScriptedGateway::new());
        let session = session(gateway.clone());
        assert_eq!(session.send("   ").await, SendOutcome::Ignored);
        assert_eq!(session.history().len(), 1);
        assert!(gateway.converse_requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_plain_reply_uses_fallback() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_converse(Ok(ModelReply::default()));
        let session = session(gateway);
        match session.send("hello").await {
            SendOutcome::Replied(msg) => assert_eq!(msg.text, EMPTY_REPLY_FALLBACK),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tool_round_trip_answers_every_call() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_converse(Ok(ModelReply::tool_calls(vec![
            call("c1", "get_system_status", json!({})),
            call("c2", "no_such_tool", json!({"x": 1})),
            call("c3", "query_product_database", json!({"product_id": "loom", "query_type": "status"})),
        ])));
        gateway.push_converse(Ok(ModelReply::text("All nodes nominal.")));
        let session = session(gateway.clone());

        let outcome = session.send("status").await;
        let reply = match outcome {
            SendOutcome::Replied(msg) => msg,
            other => panic!("unexpected outcome {:?}", other),
        };

        let requests = gateway.converse_requests();
        assert_eq!(requests.len(), 2);
        let follow_up = &requests[1];
        assert_eq!(follow_up.tool_call_ids(), vec!["c1", "c2", "c3"]);
        assert_eq!(follow_up.tool_result_ids(), vec!["c1", "c2", "c3"]);

        assert_eq!(reply.text, "All nodes nominal.");
        assert_eq!(reply.widget.as_ref().map(Widget::kind), Some("status"));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_error_tool_output_does_not_set_widget() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_converse(Ok(ModelReply::tool_calls(vec![
            call("c1", "query_product_database", json!({"product_id": "toaster", "query_type": "status"})),
            call("c2", "navigate_to", json!({"page": "blog"})),
        ])));
        gateway.push_converse(Ok(ModelReply::default()));
        let session = session(gateway);

        match session.send("show me the toaster").await {
            SendOutcome::Replied(msg) => {
                assert_eq!(msg.text, TOOL_REPLY_FALLBACK);
                assert_eq!(msg.widget.as_ref().map(Widget::kind), Some("navigation"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tool_turns_are_not_kept_in_history() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_converse(Ok(ModelReply::tool_calls(vec![call(
            "c1",
            "get_system_status",
            json!({}),
        )])));
        gateway.push_converse(Ok(ModelReply::text("stable")));
        gateway.push_converse(Ok(ModelReply::text("again")));
        let session = session(gateway.clone());

        session.send("status").await;
        session.send("and now?").await;

        let third = &gateway.converse_requests()[2];
        assert_eq!(
            third.turns,
            vec![
                Turn::User("status".to_string()),
                Turn::Model("stable".to_string()),
                Turn::User("and now?".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_gateway_error_appends_transient_notice() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_converse(Err(crate::error::AstraiError::Gateway(
            "Rpc transport failure".to_string(),
        )
        .into()));
        gateway.push_converse(Ok(ModelReply::text("back online")));
        let session = session(gateway.clone());

        match session.send("hello").await {
            SendOutcome::Failed(msg) => {
                assert_eq!(msg.text, CONNECTION_SEVERED);
                assert!(msg.transient);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(session.state(), SessionState::Idle);

        session.send("retry").await;
        let second = &gateway.converse_requests()[1];
        assert_eq!(
            second.turns,
            vec![
                Turn::User("hello".to_string()),
                Turn::User("retry".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_second_round_failure_is_reported() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_converse(Ok(ModelReply::tool_calls(vec![call(
            "c1",
            "get_system_status",
            json!({}),
        )])));
        let session = session(gateway);
        assert!(matches!(session.send("status").await, SendOutcome::Failed(_)));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_tool_indicator_resets_after_cooldown() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_converse(Ok(ModelReply::tool_calls(vec![call(
            "c1",
            "get_system_status",
            json!({}),
        )])));
        gateway.push_converse(Ok(ModelReply::text("ok")));
        let session = session(gateway);

        session.send("status").await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!session.is_tool_active());
    }

    /// Answers tool calls, then holds the fourth round until released
    #[derive(Default)]
    struct HeldSecondTurn {
        rounds: std::sync::atomic::AtomicUsize,
        release: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl ModelGateway for HeldSecondTurn {
        async fn converse(&self, _request: &ConverseRequest) -> crate::error::Result<ModelReply> {
            match self.rounds.fetch_add(1, Ordering::SeqCst) {
                0 | 2 => Ok(ModelReply::tool_calls(vec![call(
                    "c1",
                    "get_system_status",
                    json!({}),
                )])),
                1 => Ok(ModelReply::text("first")),
                _ => {
                    self.release.notified().await;
                    Ok(ModelReply::text("second"))
                }
            }
        }

        async fn generate(&self, _request: &crate::providers::GenerateRequest) -> crate::error::Result<String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_stale_cooldown_does_not_clear_later_turn() {
        let gateway = Arc::new(HeldSecondTurn::default());
        let config = ChatConfig {
            tool_cooldown_ms: 50,
            ..config()
        };
        let session = Arc::new(ConversationSession::new(
            gateway.clone(),
            Arc::new(ToolRegistry::with_defaults(Duration::ZERO)),
            config,
            Locale::En,
        ));

        session.send("status").await;
        let second = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.send("status again").await })
        };
        while gateway.rounds.load(Ordering::SeqCst) < 4 {
            tokio::task::yield_now().await;
        }

        // The first turn's cool-down elapses while the second turn is mid-flight
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(session.is_tool_active());

        gateway.release.notify_one();
        assert!(matches!(second.await.unwrap(), SendOutcome::Replied(_)));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!session.is_tool_active());
    }

    #[tokio::test]
    async fn test_navigation_is_dispatched_to_ui() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_converse(Ok(ModelReply::tool_calls(vec![call(
            "c1",
            "navigate_to",
            json!({"page": "evolution"}),
        )])));
        gateway.push_converse(Ok(ModelReply::text("Redirecting.")));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let session = session(gateway).with_ui_channel(tx);

        session.send("take me to the logs").await;
        let command = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(
            command,
            Some(UiCommand::Navigate {
                path: "/evolution".to_string()
            })
        );
    }
}
