//! The sandbox platform abstraction.
//!
//! The relay treats the sandbox service purely by capability: create an
//! isolated execution context of a given flavor, submit a task and read its
//! native event stream, reset a context to baseline, terminate it. The
//! platform's own isolation technology is out of scope.

use futures::stream::BoxStream;
use relay_core::RelayError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for one sandbox execution context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SandboxId(String);

impl SandboxId {
    /// Wrap a platform-assigned id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SandboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sandbox flavor, selecting the provisioned capability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxFlavor {
    /// Full agent environment with browser and media tooling
    AgentReady,
    /// Minimal environment for short, headless tasks
    Headless,
}

impl SandboxFlavor {
    /// Wire label for this flavor.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgentReady => "agent-ready",
            Self::Headless => "headless",
        }
    }

    /// Parse a wire label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "agent-ready" => Some(Self::AgentReady),
            "headless" => Some(Self::Headless),
            _ => None,
        }
    }
}

impl fmt::Display for SandboxFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A sandbox the platform has provisioned for us.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionedSandbox {
    /// Platform-assigned id
    pub id: SandboxId,
    /// Public base URL under which written files become fetchable
    pub base_url: String,
}

/// One task submitted into a sandbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// The task statement
    pub instructions: String,
    /// Condensed conversation context preceding the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    /// Agent model the sandbox should run the task with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_model: Option<String>,
}

impl TaskSpec {
    /// Task with bare instructions.
    #[must_use]
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            transcript: None,
            agent_model: None,
        }
    }

    /// Attach conversation context.
    #[must_use]
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = Some(transcript.into());
        self
    }

    /// Name the agent model the sandbox should run.
    #[must_use]
    pub fn with_agent_model(mut self, model: impl Into<String>) -> Self {
        self.agent_model = Some(model.into());
        self
    }
}

/// Native structured event reported by a running sandbox.
///
/// The tag set tracks the platform protocol; anything the relay does not
/// recognize lands on [`SandboxEvent::Unknown`] and is surfaced as generic
/// progress rather than dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SandboxEvent {
    /// Free-form progress line
    Status {
        /// Progress text
        message: String,
    },
    /// The agent invoked a tool
    ToolUse {
        /// Tool name
        tool: String,
        /// Tool argument summary
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// Answer text produced by the agent
    Output {
        /// Text delta
        text: String,
    },
    /// A file was written inside the sandbox
    FileWritten {
        /// Sandbox-relative path
        path: String,
        /// MIME type, if the platform detected one
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        /// Size in bytes
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
    },
    /// Task finished cleanly
    Completed,
    /// Task failed inside the sandbox
    Failed {
        /// Platform-reported reason
        message: String,
    },
    /// Unrecognized event tag
    #[serde(other)]
    Unknown,
}

impl SandboxEvent {
    /// Whether this event ends the task.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }
}

/// The sandbox platform capability surface.
#[async_trait::async_trait]
pub trait SandboxPlatform: Send + Sync {
    /// Provision a fresh sandbox of the given flavor.
    ///
    /// # Errors
    /// Returns [`RelayError::SandboxUnavailable`] when the platform cannot
    /// provision.
    async fn create(&self, flavor: SandboxFlavor) -> Result<ProvisionedSandbox, RelayError>;

    /// Submit a task and stream its native events.
    ///
    /// # Errors
    /// Returns error when the submission itself fails; mid-stream failures
    /// surface as `Err` items on the stream.
    async fn submit(
        &self,
        sandbox: &ProvisionedSandbox,
        task: TaskSpec,
    ) -> Result<BoxStream<'static, Result<SandboxEvent, RelayError>>, RelayError>;

    /// Reset a sandbox to its clean baseline state.
    ///
    /// # Errors
    /// Returns error when the reset fails; callers must then terminate.
    async fn reset(&self, id: &SandboxId) -> Result<(), RelayError>;

    /// Terminate a sandbox. Idempotent on the platform side.
    ///
    /// # Errors
    /// Returns error when the platform rejects the call.
    async fn terminate(&self, id: &SandboxId) -> Result<(), RelayError>;
}
