//! The routing decision model.
//!
//! A [`Decision`] is the single authoritative routing choice made for one
//! request: which execution path handles it, and which model class serves
//! it. Decisions come from exactly one of two sources — a well-formed caller
//! hint, or one classification call — and are never overridden downstream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution path for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutePath {
    /// Direct single backend call, no sandbox
    Fast,
    /// Task executed inside an isolated, tool-capable sandbox
    Agent,
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Agent => write!(f, "agent"),
        }
    }
}

/// Model class referenced by a decision.
///
/// Classes are resolved to concrete backend connection parameters by the
/// model registry; the relay never routes on raw model id strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelClass {
    /// Default conversational model
    #[serde(rename = "plain")]
    Plain,
    /// Light reasoning, still fast-path
    #[serde(rename = "light-reasoning")]
    LightReasoning,
    /// Heavy reasoning without tool access
    #[serde(rename = "hard-reasoning-no-tools")]
    HardReasoning,
    /// Agent model for simple, short tasks
    #[serde(rename = "simple-task-model")]
    SimpleTask,
    /// Full general-purpose agent model
    #[serde(rename = "general-agent-model")]
    GeneralAgent,
    /// Designated multimodal model, forced whenever image content is present
    #[serde(rename = "multimodal")]
    Multimodal,
}

impl ModelClass {
    /// Wire label for this class.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::LightReasoning => "light-reasoning",
            Self::HardReasoning => "hard-reasoning-no-tools",
            Self::SimpleTask => "simple-task-model",
            Self::GeneralAgent => "general-agent-model",
            Self::Multimodal => "multimodal",
        }
    }

    /// Parse a wire label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "plain" => Some(Self::Plain),
            "light-reasoning" => Some(Self::LightReasoning),
            "hard-reasoning-no-tools" => Some(Self::HardReasoning),
            "simple-task-model" => Some(Self::SimpleTask),
            "general-agent-model" => Some(Self::GeneralAgent),
            "multimodal" => Some(Self::Multimodal),
            _ => None,
        }
    }

    /// All classes the registry must know how to reach.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::Plain,
            Self::LightReasoning,
            Self::HardReasoning,
            Self::SimpleTask,
            Self::GeneralAgent,
            Self::Multimodal,
        ]
    }
}

impl fmt::Display for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authoritative (path, model) routing choice for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Execution path
    pub path: RoutePath,
    /// Model class
    pub model: ModelClass,
}

/// The closed enumeration of classifier-producible pairs.
///
/// Hints and classifier output are validated against this list; the
/// multimodal class is reachable only through the image-content override,
/// never as a classified or hinted pair.
pub const LEGAL_PAIRS: [Decision; 5] = [
    Decision {
        path: RoutePath::Fast,
        model: ModelClass::Plain,
    },
    Decision {
        path: RoutePath::Fast,
        model: ModelClass::LightReasoning,
    },
    Decision {
        path: RoutePath::Fast,
        model: ModelClass::HardReasoning,
    },
    Decision {
        path: RoutePath::Agent,
        model: ModelClass::SimpleTask,
    },
    Decision {
        path: RoutePath::Agent,
        model: ModelClass::GeneralAgent,
    },
];

impl Decision {
    /// The conservative default used when classification fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            path: RoutePath::Fast,
            model: ModelClass::Plain,
        }
    }

    /// Resolve `(path, model)` wire labels against [`LEGAL_PAIRS`].
    #[must_use]
    pub fn from_labels(path: &str, model: &str) -> Option<Self> {
        let path = match path {
            "fast" => RoutePath::Fast,
            "agent" => RoutePath::Agent,
            _ => return None,
        };
        let model = ModelClass::from_label(model)?;
        let candidate = Self { path, model };
        LEGAL_PAIRS.contains(&candidate).then_some(candidate)
    }

    /// Apply the image-content override: the model becomes the designated
    /// multimodal model, the path is untouched.
    #[must_use]
    pub fn with_multimodal_model(self) -> Self {
        Self {
            path: self.path,
            model: ModelClass::Multimodal,
        }
    }

    /// Whether this pair is in the closed classifier enumeration.
    #[must_use]
    pub fn is_legal_pair(&self) -> bool {
        LEGAL_PAIRS.contains(self)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.path, self.model)
    }
}
