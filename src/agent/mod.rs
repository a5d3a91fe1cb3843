//! Conversation layer
//!
//! The visible chat history and the session that runs each exchange
//! against the model gateway, dispatching tool calls locally.

pub mod message;
pub mod session;

pub use message::{ChatMessage, Role};
pub use session::{ConversationSession, SendOutcome, SessionState, UiCommand};
