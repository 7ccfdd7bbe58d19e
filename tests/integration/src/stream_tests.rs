//! Streaming behavior: keepalive cadence, the global ceiling, ordering.

use crate::fixtures::*;
use crate::mock_backends::*;
use futures_util::StreamExt;
use relay_config::{AgentConfig, StreamConfig};
use relay_core::{StreamEvent, TextDelta};
use std::time::Duration;
use tokio::time::Instant;

/// The gap between consecutive emitted events, keepalives included, never
/// exceeds the keepalive interval plus one tick.
#[tokio::test(start_paused = true)]
async fn test_event_gap_never_exceeds_keepalive_interval() {
    let keepalive = Duration::from_secs(15);
    let relay = TestRelayBuilder::new()
        .inference(
            MockInferenceBackend::streaming(vec![
                TextDelta::content("slow"),
                TextDelta::content("backend"),
                TextDelta::content("answer"),
            ])
            .with_delay(Duration::from_secs(40)),
        )
        .stream_config(StreamConfig {
            keepalive_interval: keepalive,
            global_timeout: Duration::from_secs(600),
        })
        .build();

    let dispatched = relay
        .dispatcher
        .handle(user_request("anything slow"))
        .await
        .expect("dispatch");

    let mut events = dispatched.events;
    let mut last = Instant::now();
    let epsilon = Duration::from_secs(1);

    while let Some(event) = events.next().await {
        let gap = last.elapsed();
        assert!(
            gap <= keepalive + epsilon,
            "gap {gap:?} exceeded keepalive budget before {event:?}"
        );
        last = Instant::now();
        if event == StreamEvent::Done {
            break;
        }
    }
}

/// Keepalives are synthesized while the executor is silent and stop once
/// real events resume.
#[tokio::test(start_paused = true)]
async fn test_keepalives_fill_silent_stretches() {
    let relay = TestRelayBuilder::new()
        .inference(
            MockInferenceBackend::streaming(vec![TextDelta::content("eventually")])
                .with_delay(Duration::from_secs(35)),
        )
        .stream_config(StreamConfig {
            keepalive_interval: Duration::from_secs(10),
            global_timeout: Duration::from_secs(600),
        })
        .build();

    let dispatched = relay
        .dispatcher
        .handle(user_request("take your time"))
        .await
        .expect("dispatch");
    let events: Vec<_> = dispatched.events.collect().await;

    let keepalives = events
        .iter()
        .filter(|e| **e == StreamEvent::KeepAlive)
        .count();
    assert!(keepalives >= 3, "expected keepalives, got {events:?}");

    let content_position = events
        .iter()
        .position(|e| matches!(e, StreamEvent::Content { .. }))
        .expect("content");
    assert!(events[..content_position]
        .iter()
        .all(|e| *e == StreamEvent::KeepAlive));
}

/// The global ceiling cancels a stuck agent run: terminal error, Done, and
/// the sandbox is terminated rather than pooled.
#[tokio::test(start_paused = true)]
async fn test_global_timeout_cancels_and_releases() {
    let platform = MockSandboxPlatform::stalling();
    let relay = TestRelayBuilder::new()
        .platform(platform)
        .agent_config(AgentConfig {
            // Reads outlast the global ceiling so the ceiling fires first.
            read_timeout: Duration::from_secs(3600),
            max_retries: 2,
            backoff_base: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            backoff_jitter: 0.0,
        })
        .stream_config(StreamConfig {
            keepalive_interval: Duration::from_secs(15),
            global_timeout: Duration::from_secs(60),
        })
        .build();

    let request = hinted_request("never finishes", "agent", "general-agent-model");
    let dispatched = relay.dispatcher.handle(request).await.expect("dispatch");
    let events: Vec<_> = dispatched.events.collect().await;

    let len = events.len();
    assert!(matches!(&events[len - 2], StreamEvent::Error(detail)
        if detail.code == "global_timeout_exceeded"));
    assert_eq!(events[len - 1], StreamEvent::Done);

    // The decomposition guidance reaches the caller.
    if let StreamEvent::Error(detail) = &events[len - 2] {
        assert!(detail.message.contains("smaller"));
    }

    // Give the detached release a beat to land.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(relay.platform.terminated(), 1);
    assert_eq!(relay.platform.resets(), 0);
}

/// Events arrive in production order with no duplication.
#[tokio::test]
async fn test_stream_order_is_preserved() {
    let platform = MockSandboxPlatform::scripted(vec![vec![
        relay_sandbox::SandboxEvent::Status {
            message: "step 1".to_string(),
        },
        relay_sandbox::SandboxEvent::Status {
            message: "step 2".to_string(),
        },
        relay_sandbox::SandboxEvent::Output {
            text: "first".to_string(),
        },
        relay_sandbox::SandboxEvent::Output {
            text: " second".to_string(),
        },
        relay_sandbox::SandboxEvent::Completed,
    ]]);
    let relay = TestRelayBuilder::new().platform(platform).build();

    let request = hinted_request("ordered task", "agent", "general-agent-model");
    let dispatched = relay.dispatcher.handle(request).await.expect("dispatch");
    let events: Vec<_> = dispatched.events.collect().await;

    let meaningful: Vec<_> = events
        .iter()
        .filter(|e| !matches!(e, StreamEvent::KeepAlive))
        .collect();

    // Startup reasoning, two statuses, two contents, Done.
    assert_eq!(meaningful.len(), 6);
    assert!(matches!(meaningful[1], StreamEvent::Reasoning { text } if text == "step 1"));
    assert!(matches!(meaningful[2], StreamEvent::Reasoning { text } if text == "step 2"));
    assert!(matches!(meaningful[3], StreamEvent::Content { text } if text == "first"));
    assert!(matches!(meaningful[4], StreamEvent::Content { text } if text == " second"));
    assert_eq!(meaningful[5], &StreamEvent::Done);
}
