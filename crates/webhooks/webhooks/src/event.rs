//! Inbound notification decoding and relevance filtering.

use serde::Deserialize;

use crate::config::WebhookConfig;

/// Event type GitHub sends for new commits on a branch.
pub const PUSH_EVENT: &str = "push";

/// Header carrying the event type.
pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// The parts of a notification the filter looks at.
///
/// Built per request and dropped once the request is classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Event type from the event header, e.g. `push`.
    pub event_type: String,
    /// `repository.full_name` from the body.
    pub repository: String,
    /// `ref` from the body, e.g. `refs/heads/main`.
    pub git_ref: String,
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    repository: RawRepository,
}

#[derive(Deserialize)]
struct RawRepository {
    full_name: String,
}

impl NotificationEvent {
    /// Decodes the event from its type header and raw JSON body.
    ///
    /// Returns `None` if the type is missing or the body lacks
    /// `repository.full_name` or `ref`.
    pub fn parse(event_type: Option<&str>, body: &[u8]) -> Option<Self> {
        let event_type = event_type?;
        let payload: RawPayload = serde_json::from_slice(body).ok()?;

        Some(Self {
            event_type: event_type.to_string(),
            repository: payload.repository.full_name,
            git_ref: payload.git_ref,
        })
    }

    /// Returns true if this is a push event.
    pub fn is_push(&self) -> bool {
        is_push_event(Some(&self.event_type))
    }
}

/// Returns true if the event type header names a push.
pub fn is_push_event(event_type: Option<&str>) -> bool {
    event_type.is_some_and(|t| t.eq_ignore_ascii_case(PUSH_EVENT))
}

/// Returns true if `event` is a push to the tracked branch of the tracked
/// repository. Repository and ref comparisons ignore case, including
/// non-ASCII letters.
pub fn is_relevant_push(event: &NotificationEvent, config: &WebhookConfig) -> bool {
    event.is_push()
        && eq_ignore_case(&event.repository, &config.repository)
        && eq_ignore_case(&event.git_ref, &config.expected_ref())
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}
