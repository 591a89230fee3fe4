//! Events emitted by the adapter.

use serde::{Deserialize, Serialize};

use crate::message::{OutgoingEvent, Seq};
use crate::types::ThreadId;

/// A typed adapter event together with its body.
///
/// Serializes with the event name as tag and the payload under `body`, the
/// layout expected inside an event message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "body", rename_all = "camelCase")]
pub enum Event {
    /// The adapter is ready to accept configuration requests.
    Initialized,
    /// Execution stopped; the body names the reasons.
    Stopped(StoppedEventBody),
    /// Execution finished; no further motion is possible.
    Terminated,
    /// Previously reported state (e.g. stack frames) is no longer valid.
    Invalidated(InvalidatedEventBody),
}

impl Event {
    /// The wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Initialized => "initialized",
            Event::Stopped(_) => "stopped",
            Event::Terminated => "terminated",
            Event::Invalidated(_) => "invalidated",
        }
    }

    /// Wrap this event into an [`OutgoingEvent`] with the given sequence
    /// number.
    pub fn into_message(self, seq: Seq) -> OutgoingEvent {
        let body = match &self {
            Event::Initialized | Event::Terminated => None,
            Event::Stopped(body) => serde_json::to_value(body).ok(),
            Event::Invalidated(body) => serde_json::to_value(body).ok(),
        };
        OutgoingEvent {
            seq,
            event: self.name().to_string(),
            body,
        }
    }
}

/// Body of the `stopped` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedEventBody {
    /// The stop reason, e.g. `breakpoint` or `step and breakpoint`.
    pub reason: String,
    /// Human readable explanation, typically the breakpoint messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub thread_id: ThreadId,
    pub all_threads_stopped: bool,
}

/// Body of the `invalidated` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidatedEventBody {
    /// The state areas that became stale (e.g. `stacks`).
    pub areas: Vec<String>,
}
