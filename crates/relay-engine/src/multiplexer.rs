//! The stream multiplexer.
//!
//! Wraps an executor's event stream with idle keepalives, the global
//! duration ceiling, and disconnect handling. Structure per request: the
//! executor produces into a bounded channel from its own task, and the
//! consumer side races that channel against two timers. Only the timestamp
//! of the last emitted event is retained; history is never buffered.
//!
//! Cancellation is cooperative but mandatory: dropping the wrapped stream
//! aborts the producer task and releases the sandbox lease (never back to
//! the warm pool) before the request counts as finished.

use crate::executor::ExecutorStream;
use crate::lease::SandboxLease;
use async_stream::stream;
use futures::stream::BoxStream;
use futures_util::StreamExt;
use relay_config::StreamConfig;
use relay_core::{RelayError, RequestId, StreamEvent};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Bounded hand-off between executor and consumer. Small on purpose: the
/// multiplexer forwards as produced and must not accumulate history.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Wraps executor streams with keepalive, timeout, and cancellation rails.
#[derive(Debug, Clone)]
pub struct StreamMultiplexer {
    config: StreamConfig,
}

/// Cleanup that must run no matter how the consumer goes away: abort the
/// producer and tear down an unreleased sandbox. Both operations are no-ops
/// when the stream already finished cleanly.
struct DisconnectGuard {
    request_id: RequestId,
    producer: AbortHandle,
    lease: Option<SandboxLease>,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.producer.abort();
        if let Some(lease) = &self.lease {
            if !lease.is_released() {
                debug!(request_id = %self.request_id, "Stream dropped, terminating sandbox");
                lease.release_detached(false);
            }
        }
    }
}

impl StreamMultiplexer {
    /// Create the multiplexer with the given timer settings.
    #[must_use]
    pub fn new(config: StreamConfig) -> Self {
        Self { config }
    }

    /// Wrap an executor stream for one request.
    #[must_use]
    pub fn wrap(
        &self,
        exec: ExecutorStream,
        request_id: RequestId,
    ) -> BoxStream<'static, StreamEvent> {
        let ExecutorStream { events, lease } = exec;
        let keepalive_interval = self.config.keepalive_interval;
        let global_timeout = self.config.global_timeout;

        let (tx, mut rx) = mpsc::channel::<StreamEvent>(EVENT_CHANNEL_CAPACITY);
        let producer = tokio::spawn(async move {
            let mut events = events;
            while let Some(event) = events.next().await {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        let guard = DisconnectGuard {
            request_id: request_id.clone(),
            producer: producer.abort_handle(),
            lease,
        };

        enum Step {
            Forward(StreamEvent),
            ProducerGone,
            GlobalTimeout,
            KeepAliveDue,
        }

        let wrapped = stream! {
            let guard = guard;
            let deadline = Instant::now() + global_timeout;
            let mut last_event = Instant::now();

            loop {
                let step = tokio::select! {
                    // Biased toward the channel: a real event already
                    // enqueued in the same tick suppresses the synthetic
                    // keepalive instead of racing it.
                    biased;

                    received = rx.recv() => match received {
                        Some(event) => Step::Forward(event),
                        None => Step::ProducerGone,
                    },

                    () = tokio::time::sleep_until(deadline) => Step::GlobalTimeout,

                    () = tokio::time::sleep_until(last_event + keepalive_interval) => {
                        Step::KeepAliveDue
                    },
                };

                match step {
                    Step::Forward(event) => {
                        last_event = Instant::now();
                        let terminal = event.is_terminal();
                        yield event;
                        if terminal {
                            break;
                        }
                    }
                    Step::ProducerGone => {
                        // Producer finished without a terminal event; close
                        // the stream properly rather than going silent.
                        debug!(request_id = %guard.request_id, "Executor ended without Done");
                        yield StreamEvent::Done;
                        break;
                    }
                    Step::GlobalTimeout => {
                        warn!(
                            request_id = %guard.request_id,
                            limit = ?global_timeout,
                            "Global timeout exceeded, cancelling executor"
                        );
                        guard.producer.abort();
                        if let Some(lease) = &guard.lease {
                            lease.release_detached(false);
                        }
                        yield StreamEvent::Error(
                            RelayError::GlobalTimeoutExceeded {
                                limit: global_timeout,
                            }
                            .to_detail(),
                        );
                        yield StreamEvent::Done;
                        break;
                    }
                    Step::KeepAliveDue => {
                        yield StreamEvent::KeepAlive;
                        last_event = Instant::now();
                    }
                }
            }
        };

        Box::pin(wrapped)
    }
}
