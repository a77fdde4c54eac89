//! Frames pushed to stream clients.

use axum::extract::ws::Message;
use portal_core::{RequestChange, ServiceRequest};
use serde::Serialize;

/// Server-to-client frame, JSON encoded with a `type` tag.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Full listing sent right after connecting.
    Snapshot { requests: Vec<ServiceRequest> },
    /// One request created or updated.
    Change {
        #[serde(flatten)]
        change: RequestChange,
    },
    /// Full listing after the stream fell behind. Replaces the client cache.
    Resync { requests: Vec<ServiceRequest> },
    Error { code: String, message: String },
}

impl ServerMessage {
    pub fn to_message(&self) -> Option<Message> {
        serde_json::to_string(self).ok().map(Message::Text)
    }
}
