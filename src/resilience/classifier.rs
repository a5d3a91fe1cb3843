//! Heuristic gateway failure classification
//!
//! Failures are classified by substring markers in the rendered error
//! chain. The rules are an ordered list evaluated first-match; anything
//! unmatched falls back to the default class. This is best effort:
//! misclassifying into [`ErrorClass::CoreHalt`] is acceptable, missing an
//! authentication failure is not.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse failure taxonomy surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorClass {
    /// Credentials are missing or rejected; recoverable by re-authentication
    AuthRequired,
    /// Transport or RPC trouble; recoverable by retrying
    SignalTurbulence,
    /// Anything else
    CoreHalt,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::AuthRequired => "AUTH_REQUIRED",
            ErrorClass::SignalTurbulence => "SIGNAL_TURBULENCE",
            ErrorClass::CoreHalt => "CORE_HALT",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markers identifying authentication failures
pub const AUTH_MARKERS: &[&str] = &[
    "API_KEY",
    "auth",
    "Auth",
    "UNAUTHENTICATED",
    "PERMISSION_DENIED",
];

/// Markers identifying transport failures
pub const TRANSPORT_MARKERS: &[&str] = &["xhr", "Rpc", "UNAVAILABLE", "timed out", "connection"];

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

struct Rule {
    predicate: Predicate,
    class: ErrorClass,
}

/// Ordered (predicate, class) rule list
///
/// # Examples
///
/// ```
/// use astrai::resilience::{ErrorClass, ErrorClassifier};
///
/// let classifier = ErrorClassifier::default();
/// assert_eq!(classifier.classify_message("API_KEY invalid"), ErrorClass::AuthRequired);
/// assert_eq!(classifier.classify_message("Rpc failed"), ErrorClass::SignalTurbulence);
/// assert_eq!(classifier.classify_message("boom"), ErrorClass::CoreHalt);
/// ```
pub struct ErrorClassifier {
    rules: Vec<Rule>,
    fallback: ErrorClass,
}

impl ErrorClassifier {
    /// Create a classifier with no rules
    pub fn new(fallback: ErrorClass) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule evaluated after all existing rules
    pub fn with_rule<P>(mut self, predicate: P, class: ErrorClass) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            predicate: Box::new(predicate),
            class,
        });
        self
    }

    /// Append a rule matching any of the given substrings
    pub fn with_markers(self, markers: &'static [&'static str], class: ErrorClass) -> Self {
        self.with_rule(
            move |message| markers.iter().any(|marker| message.contains(marker)),
            class,
        )
    }

    /// Classify an error by its full context chain
    pub fn classify(&self, error: &anyhow::Error) -> ErrorClass {
        self.classify_message(&format!("{:#}", error))
    }

    /// Classify a raw error message
    pub fn classify_message(&self, message: &str) -> ErrorClass {
        self.rules
            .iter()
            .find(|rule| (rule.predicate)(message))
            .map(|rule| rule.class)
            .unwrap_or(self.fallback)
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(ErrorClass::CoreHalt)
            .with_markers(AUTH_MARKERS, ErrorClass::AuthRequired)
            .with_markers(TRANSPORT_MARKERS, ErrorClass::SignalTurbulence)
    }
}

impl fmt::Debug for ErrorClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorClassifier")
            .field("rules", &self.rules.len())
            .field("fallback", &self.fallback)
            .finish()
    }
}
