//! Outbound render instructions.
//!
//! The bot never talks to the chat platform directly; each handled event
//! yields a list of these instructions for the excluded transport layer to
//! execute. Formatting policy beyond what affects correctness (which
//! buttons appear, what gets edited) lives out there.

use serde::{Deserialize, Serialize};

use crate::router::events::{ChatRef, MessageRef};
use crate::token::ActionToken;

/// One inline-keyboard button carrying an encoded [`ActionToken`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: &ActionToken) -> Self {
        Self {
            label: label.into(),
            token: token.encode(),
        }
    }
}

/// Rows of buttons attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn row(buttons: Vec<Button>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }

    pub fn push_row(&mut self, buttons: Vec<Button>) {
        self.rows.push(buttons);
    }

    /// Confirm + cancel pair for a pending handshake.
    pub fn confirm_cancel(confirm: &ActionToken) -> Self {
        Self::row(vec![
            Button::new("Confirm", confirm),
            Button::new("Cancel", &ActionToken::Cancel),
        ])
    }

    /// Single dismiss control for terminal notices.
    pub fn dismiss() -> Self {
        Self::row(vec![Button::new("Dismiss", &ActionToken::Cancel)])
    }

    /// All button payloads, row by row. Test helper for flows that must
    /// emit specific tokens.
    pub fn tokens(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.token.as_str())
            .collect()
    }
}

/// One article in an inline search answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineResult {
    pub title: String,
    pub body: String,
    pub keyboard: Option<Keyboard>,
}

/// One outbound instruction for the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Render {
    /// Post a new message.
    SendMessage {
        chat: ChatRef,
        text: String,
        keyboard: Option<Keyboard>,
    },

    /// Answer an inline search with zero or more articles.
    AnswerInlineSearch {
        query_id: String,
        results: Vec<InlineResult>,
    },

    /// Rewrite an existing message in place.
    EditMessage {
        message: MessageRef,
        text: String,
        keyboard: Option<Keyboard>,
    },

    /// Short transient acknowledgement shown to the presser.
    AnswerButtonPress { query_id: String, text: String },
}
