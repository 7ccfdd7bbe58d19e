//! The executor output contract.

use crate::lease::SandboxLease;
use futures::stream::BoxStream;
use relay_core::StreamEvent;

/// Output of one executor run: the ordered event stream plus the sandbox
/// lease when one is held.
///
/// The lease rides alongside the stream so the multiplexer can release the
/// sandbox on timeout or caller disconnect without reaching into executor
/// internals. Fast-path runs carry no lease; dropping their stream cancels
/// the backend call directly.
pub struct ExecutorStream {
    /// Ordered stream events, terminated by [`StreamEvent::Done`]
    pub events: BoxStream<'static, StreamEvent>,
    /// The sandbox lease, for agent-path runs
    pub lease: Option<SandboxLease>,
}

impl ExecutorStream {
    /// Stream without an attached lease.
    #[must_use]
    pub fn unleased(events: BoxStream<'static, StreamEvent>) -> Self {
        Self {
            events,
            lease: None,
        }
    }

    /// Stream with a sandbox lease attached.
    #[must_use]
    pub fn leased(events: BoxStream<'static, StreamEvent>, lease: SandboxLease) -> Self {
        Self {
            events,
            lease: Some(lease),
        }
    }
}
