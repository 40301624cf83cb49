//! Inbound event types.
//!
//! The chat transport itself is out of scope; whatever drives the bot
//! (long polling, webhook, test harness) translates platform updates into
//! these events before calling [`crate::router::Bot::handle`].

use serde::{Deserialize, Serialize};

use crate::store::PlatformId;

/// The chat a reply should go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRef(pub i64);

/// A specific message that can be edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat: ChatRef,
    pub message_id: i64,
}

/// The acting chat user. The handle is whatever public name the platform
/// reports; it may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub platform_id: PlatformId,
    pub handle: Option<String>,
}

impl Identity {
    pub fn new(platform_id: i64) -> Self {
        Self {
            platform_id: PlatformId(platform_id),
            handle: None,
        }
    }

    pub fn with_handle(platform_id: i64, handle: &str) -> Self {
        Self {
            platform_id: PlatformId(platform_id),
            handle: Some(handle.to_string()),
        }
    }
}

/// One inbound user action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A slash command, name without the leading slash.
    Command {
        name: String,
        sender: Identity,
        chat: ChatRef,
    },

    /// Any other text message.
    FreeText {
        text: String,
        sender: Identity,
        chat: ChatRef,
    },

    /// An inline search query (the admin-facing entry point for the
    /// link/promote handshake).
    InlineSearch {
        query_id: String,
        query: String,
        sender: Identity,
    },

    /// A press on an inline-keyboard button; `token` is returned verbatim
    /// from the button payload.
    ButtonPress {
        query_id: String,
        token: String,
        presser: Identity,
        message: MessageRef,
    },
}
