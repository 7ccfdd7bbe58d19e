//! In-process mocks for the relay's outbound collaborators.
//!
//! The decision backend, inference backend, and sandbox platform are all
//! scriptable: tests declare the replies/events up front and assert on the
//! recorded interactions afterwards.

use async_trait::async_trait;
use futures::stream::BoxStream;
use relay_core::{ChatMessage, DecisionBackend, InferenceBackend, InferenceCall, RelayError, TextDelta};
use relay_sandbox::{
    ProvisionedSandbox, SandboxEvent, SandboxFlavor, SandboxId, SandboxPlatform, TaskSpec,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Decision backend replying with a fixed string, optionally after a delay.
pub struct MockDecisionBackend {
    reply: String,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockDecisionBackend {
    /// Backend that answers instantly.
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    /// Backend that stalls past any classifier budget.
    pub fn stalling(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: String::new(),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    /// How many classification calls were issued.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecisionBackend for MockDecisionBackend {
    async fn complete_once(&self, _messages: Vec<ChatMessage>) -> Result<String, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.reply.clone())
    }
}

/// Inference backend replaying scripted deltas.
pub struct MockInferenceBackend {
    deltas: Vec<TextDelta>,
    delay_between: Option<Duration>,
    calls: AtomicUsize,
}

impl MockInferenceBackend {
    /// Backend streaming the given deltas then closing.
    pub fn streaming(deltas: Vec<TextDelta>) -> Arc<Self> {
        Arc::new(Self {
            deltas,
            delay_between: None,
            calls: AtomicUsize::new(0),
        })
    }

    /// Insert a delay before every delta.
    pub fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            deltas: self.deltas.clone(),
            delay_between: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    /// How many streaming calls were opened.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceBackend for MockInferenceBackend {
    async fn stream(
        &self,
        _call: InferenceCall,
    ) -> Result<BoxStream<'static, Result<TextDelta, RelayError>>, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let deltas = self.deltas.clone();
        let delay = self.delay_between;

        let stream = async_stream::stream! {
            for delta in deltas {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield Ok(delta);
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Sandbox platform replaying one scripted event sequence per submission.
///
/// When submissions outnumber scripts, the extra submissions stall forever,
/// which is how read-timeout scenarios are staged.
pub struct MockSandboxPlatform {
    scripts: Mutex<Vec<Vec<SandboxEvent>>>,
    created_flavors: Mutex<Vec<SandboxFlavor>>,
    created: AtomicUsize,
    submits: AtomicUsize,
    resets: AtomicUsize,
    terminated: AtomicUsize,
}

impl MockSandboxPlatform {
    /// Platform replaying `scripts` in submission order.
    pub fn scripted(scripts: Vec<Vec<SandboxEvent>>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts),
            created_flavors: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
            submits: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            terminated: AtomicUsize::new(0),
        })
    }

    /// Platform whose every submission stalls.
    pub fn stalling() -> Arc<Self> {
        Self::scripted(Vec::new())
    }

    /// Flavors of every sandbox created, in order.
    pub fn created_flavors(&self) -> Vec<SandboxFlavor> {
        self.created_flavors.lock().unwrap().clone()
    }

    /// Total sandboxes created.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Total task submissions.
    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    /// Total baseline resets (pool returns).
    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    /// Total terminations.
    pub fn terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SandboxPlatform for MockSandboxPlatform {
    async fn create(&self, flavor: SandboxFlavor) -> Result<ProvisionedSandbox, RelayError> {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        self.created_flavors.lock().unwrap().push(flavor);
        Ok(ProvisionedSandbox {
            id: SandboxId::new(format!("sbx_{n}")),
            base_url: format!("https://sbx-{n}.sandbox.internal"),
        })
    }

    async fn submit(
        &self,
        _sandbox: &ProvisionedSandbox,
        _task: TaskSpec,
    ) -> Result<BoxStream<'static, Result<SandboxEvent, RelayError>>, RelayError> {
        let round = self.submits.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap().get(round).cloned();

        match script {
            Some(events) => {
                let events: Vec<_> = events.into_iter().map(Ok).collect();
                Ok(Box::pin(futures::stream::iter(events)))
            }
            None => Ok(Box::pin(futures::stream::pending())),
        }
    }

    async fn reset(&self, _id: &SandboxId) -> Result<(), RelayError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn terminate(&self, _id: &SandboxId) -> Result<(), RelayError> {
        self.terminated.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
