use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ──────────────────── Message Types ────────────────────

/// Message heard in a chat room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Room (or channel) the message was posted in.
    pub room: String,
    /// Sender identifier, used when addressing replies.
    pub sender_id: String,
    /// Display name of the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// Message text content.
    pub text: String,
    /// Host-specific metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Message timestamp (unix millis).
    #[serde(default)]
    pub timestamp: i64,
}

impl InboundMessage {
    /// Build a plain text message with no metadata.
    pub fn text(
        room: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            room: room.into(),
            sender_id: sender_id.into(),
            sender_name: None,
            text: text.into(),
            metadata: HashMap::new(),
            timestamp: 0,
        }
    }
}

/// How an outbound message is delivered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutboundKind {
    /// Addressed at the recipient (`@user text`).
    Reply,
    /// Posted to the room as-is.
    #[default]
    Send,
}

/// Message from the plugin back to the chat room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Room to post into.
    pub room: String,
    /// User the message is addressed at, for replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    /// Message text, without any addressing prefix.
    pub text: String,
    #[serde(default)]
    pub kind: OutboundKind,
}

impl OutboundMessage {
    /// A reply addressed at the sender of `to`.
    pub fn reply(to: &InboundMessage, text: impl Into<String>) -> Self {
        Self {
            room: to.room.clone(),
            recipient_id: Some(to.sender_id.clone()),
            text: text.into(),
            kind: OutboundKind::Reply,
        }
    }

    /// A plain message into the room of `to`.
    pub fn send(to: &InboundMessage, text: impl Into<String>) -> Self {
        Self {
            room: to.room.clone(),
            recipient_id: None,
            text: text.into(),
            kind: OutboundKind::Send,
        }
    }

    /// Text as it appears in the room.
    pub fn rendered(&self) -> String {
        match (&self.kind, &self.recipient_id) {
            (OutboundKind::Reply, Some(recipient)) => format!("@{recipient} {}", self.text),
            _ => self.text.clone(),
        }
    }
}

// ──────────────────── Respond Types ────────────────────

/// A registered trigger and the text sent back when it is heard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseEntry {
    pub trigger: String,
    pub response: String,
}

impl fmt::Display for ResponseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "respond to {} with {}", self.trigger, self.response)
    }
}

/// Status of a running plugin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PluginStatus {
    /// Plugin has not been initialized.
    Stopped,
    /// Plugin is initialized and handling messages.
    Running,
    /// Plugin hit an unrecoverable error.
    Error(String),
}
