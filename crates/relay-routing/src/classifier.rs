//! The decision classifier.
//!
//! Turns message history plus an optional caller hint into exactly one
//! [`Decision`]. Classification failures never fail the request: every
//! failure mode degrades to the conservative default and is logged.

use relay_core::{ChatMessage, ChatRequest, Decision, DecisionBackend, RelayError};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Instruction sent to the decision backend. The reply must be a single JSON
/// object naming one of the five legal pairs.
const CLASSIFIER_SYSTEM_PROMPT: &str = "\
You are a request router. Read the conversation and pick exactly one route.\n\
Reply with a single JSON object and nothing else: {\"path\": P, \"model\": M}.\n\
Legal choices:\n\
- {\"path\":\"fast\",\"model\":\"plain\"} - ordinary chat, lookups, short answers\n\
- {\"path\":\"fast\",\"model\":\"light-reasoning\"} - some thinking, no tools needed\n\
- {\"path\":\"fast\",\"model\":\"hard-reasoning-no-tools\"} - hard reasoning, still no tools\n\
- {\"path\":\"agent\",\"model\":\"simple-task-model\"} - short task needing tools or a browser\n\
- {\"path\":\"agent\",\"model\":\"general-agent-model\"} - long or open-ended task needing tools\n\
Any other combination is invalid.";

/// How many trailing messages are shown to the decision backend.
const CLASSIFIER_CONTEXT_MESSAGES: usize = 6;

#[derive(Debug, Deserialize)]
struct ClassifierReply {
    path: String,
    model: String,
}

/// Stateless classifier over a dedicated decision backend.
///
/// No state is retained between calls; each request gets one independent
/// classification.
pub struct DecisionClassifier {
    backend: Arc<dyn DecisionBackend>,
    timeout: Duration,
}

impl DecisionClassifier {
    /// Create a classifier with the given latency budget.
    #[must_use]
    pub fn new(backend: Arc<dyn DecisionBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Produce the one authoritative decision for a request.
    ///
    /// - A well-formed hint is returned unchanged; no classification call is
    ///   issued and no other rule applies.
    /// - Image content forces the multimodal model; the path is still
    ///   classified.
    /// - Timeout or malformed output falls back to [`Decision::fallback`].
    pub async fn classify(&self, request: &ChatRequest) -> Decision {
        if let Some(hinted) = request.hinted_decision() {
            debug!(request_id = %request.id, decision = %hinted, "Honoring routing hint");
            return hinted;
        }

        let has_image = request.has_image();
        let decision = match self.classify_via_backend(request).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(
                    request_id = %request.id,
                    error = %e,
                    "Classification degraded to default decision"
                );
                Decision::fallback()
            }
        };

        let decision = if has_image {
            decision.with_multimodal_model()
        } else {
            decision
        };

        debug!(request_id = %request.id, decision = %decision, "Decision made");
        decision
    }

    async fn classify_via_backend(&self, request: &ChatRequest) -> Result<Decision, RelayError> {
        let messages = self.build_prompt(request);

        let reply = tokio::time::timeout(self.timeout, self.backend.complete_once(messages))
            .await
            .map_err(|_| RelayError::ClassificationTimeout {
                elapsed: self.timeout,
            })??;

        Self::parse_reply(&reply)
    }

    /// Condense the conversation tail into the classification prompt.
    fn build_prompt(&self, request: &ChatRequest) -> Vec<ChatMessage> {
        let tail: Vec<String> = request
            .messages
            .iter()
            .rev()
            .take(CLASSIFIER_CONTEXT_MESSAGES)
            .map(|m| format!("{}: {}", m.role, m.content.to_text_lossy()))
            .collect();

        let transcript = tail.into_iter().rev().collect::<Vec<_>>().join("\n");

        vec![
            ChatMessage::system(CLASSIFIER_SYSTEM_PROMPT),
            ChatMessage::user(transcript),
        ]
    }

    /// Parse a backend reply into a legal pair.
    fn parse_reply(reply: &str) -> Result<Decision, RelayError> {
        let trimmed = reply
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        let parsed: ClassifierReply =
            serde_json::from_str(trimmed).map_err(|e| RelayError::ClassificationMalformed {
                detail: format!("not a JSON pair: {e}"),
            })?;

        Decision::from_labels(&parsed.path, &parsed.model).ok_or_else(|| {
            RelayError::ClassificationMalformed {
                detail: format!("'{}+{}' is not a legal pair", parsed.path, parsed.model),
            }
        })
    }
}
