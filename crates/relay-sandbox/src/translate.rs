//! Translation from native sandbox events to relay stream events.

use crate::platform::SandboxEvent;
use relay_core::{ArtifactRef, ErrorDetail, StreamEvent};

/// Translate one native sandbox event into a stream event.
///
/// The match is exhaustive: every native variant maps somewhere, and
/// unrecognized events become generic progress rather than disappearing.
/// Sandbox-relative file paths are resolved against the sandbox's public
/// base URL so the resulting [`ArtifactRef`] is fetchable as-is.
#[must_use]
pub fn translate_event(event: SandboxEvent, base_url: &str) -> StreamEvent {
    match event {
        SandboxEvent::Status { message } => StreamEvent::reasoning(message),
        SandboxEvent::ToolUse { tool, detail } => {
            let text = match detail {
                Some(detail) => format!("[{tool}] {detail}"),
                None => format!("[{tool}]"),
            };
            StreamEvent::reasoning(text)
        }
        SandboxEvent::Output { text } => StreamEvent::content(text),
        SandboxEvent::FileWritten {
            path,
            mime_type,
            size,
        } => StreamEvent::Artifact(ArtifactRef {
            url: resolve_artifact_url(base_url, &path),
            mime_type,
            size,
        }),
        SandboxEvent::Completed => StreamEvent::Done,
        SandboxEvent::Failed { message } => {
            StreamEvent::Error(ErrorDetail::new("sandbox_task_failed", message))
        }
        SandboxEvent::Unknown => StreamEvent::reasoning("working..."),
    }
}

/// Join a sandbox-relative path onto the sandbox's public base URL.
fn resolve_artifact_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
