//! Event router.
//!
//! # Data Flow
//! ```text
//! transport (excluded)
//!     → events.rs (typed inbound events)
//!     → mod.rs dispatch:
//!         Command / FreeText   → purchase flow, catalog rendering
//!         InlineSearch         → handshake initiation
//!         ButtonPress          → token decode → handshake / purchase
//!     → render.rs (outbound instructions, executed by the transport)
//! ```
//!
//! # Design Decisions
//! - Every core operation returns `Result`; this module is the single
//!   boundary that turns errors into user-visible text. Expected outcomes
//!   render their own message; internal faults are logged for the operator
//!   and answered with a generic notice.
//! - A handler never panics the process and never leaves the store
//!   half-written: store mutations are single atomic operations.

pub mod events;
pub mod render;

use std::sync::Arc;

use crate::error::BotError;
use crate::gateway::Ledger;
use crate::handshake;
use crate::observability::metrics;
use crate::purchase;
use crate::router::events::{ChatRef, Identity, InboundEvent, MessageRef};
use crate::router::render::{Keyboard, Render};
use crate::store::LinkStore;
use crate::token::ActionToken;

const GREETING: &str = "Hello! I am the mate bot.\n\
    /list - show the drinks on offer\n\
    /buy - pick a drink with one press\n\
    /balance - show your ledger balance\n\
    Ask an administrator to link you to a ledger account first.";

const CONFUSED: &str = "Hm? I did not understand that.";

const INTERNAL: &str = "Something went wrong. The operators have been notified.";

/// The bot core: owns the link store handle and the ledger gateway, and
/// maps each inbound event to a list of render instructions.
pub struct Bot<L: Ledger> {
    store: Arc<LinkStore>,
    ledger: L,
}

impl<L: Ledger> Bot<L> {
    pub fn new(store: Arc<LinkStore>, ledger: L) -> Self {
        Self { store, ledger }
    }

    /// Handle one inbound event. Never panics and never returns an error;
    /// every failure becomes a render instruction.
    pub async fn handle(&self, event: InboundEvent) -> Vec<Render> {
        match event {
            InboundEvent::Command { name, sender, chat } => {
                self.command(&name, &sender, chat).await
            }
            InboundEvent::FreeText { text, sender, chat } => {
                self.free_text(&text, &sender, chat).await
            }
            InboundEvent::InlineSearch {
                query_id,
                query,
                sender,
            } => self.inline_search(query_id, &query, &sender).await,
            InboundEvent::ButtonPress {
                query_id,
                token,
                presser,
                message,
            } => self.button_press(query_id, &token, &presser, message).await,
        }
    }

    async fn command(&self, name: &str, sender: &Identity, chat: ChatRef) -> Vec<Render> {
        match name {
            "start" | "help" => vec![send(chat, GREETING.to_string(), None)],
            "list" => match self.ledger.catalog().await {
                Ok(catalog) => vec![send(chat, purchase::catalog_text(&catalog), None)],
                Err(e) => vec![send(chat, self.render_error(&e.into()), None)],
            },
            "buy" => match self.ledger.catalog().await {
                Ok(catalog) => vec![send(
                    chat,
                    "Pick a drink:".to_string(),
                    Some(purchase::purchase_keyboard(&catalog)),
                )],
                Err(e) => vec![send(chat, self.render_error(&e.into()), None)],
            },
            "balance" => {
                let result =
                    purchase::balance_text(&self.store, &self.ledger, sender.platform_id).await;
                match result {
                    Ok(text) => vec![send(chat, text, None)],
                    Err(e) => vec![send(chat, self.render_error(&e), None)],
                }
            }
            _ => vec![send(chat, CONFUSED.to_string(), None)],
        }
    }

    /// Free text is always treated as a purchase attempt echoing a catalog
    /// line; anything else comes back as the confused notice.
    async fn free_text(&self, text: &str, sender: &Identity, chat: ChatRef) -> Vec<Render> {
        let result = purchase::buy_by_text(&self.store, &self.ledger, sender.platform_id, text).await;
        match result {
            Ok(receipt) => {
                metrics::record_purchase("ok");
                vec![send(chat, receipt.text, None)]
            }
            Err(e) => {
                metrics::record_purchase(e.kind());
                vec![send(chat, self.render_error(&e), None)]
            }
        }
    }

    async fn inline_search(&self, query_id: String, query: &str, sender: &Identity) -> Vec<Render> {
        let results = match handshake::initiate(&self.store, &self.ledger, sender, query).await {
            Ok(Some(result)) => vec![result],
            Ok(None) => Vec::new(),
            Err(e) => vec![render::InlineResult {
                title: "Cannot start that".to_string(),
                body: self.render_error(&e),
                keyboard: Some(Keyboard::dismiss()),
            }],
        };
        vec![Render::AnswerInlineSearch { query_id, results }]
    }

    async fn button_press(
        &self,
        query_id: String,
        payload: &str,
        presser: &Identity,
        message: MessageRef,
    ) -> Vec<Render> {
        let token = match ActionToken::decode(payload) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(payload, error = %e, "Rejected button payload");
                return vec![answer(query_id, self.render_error(&BotError::MalformedToken))];
            }
        };

        match token {
            ActionToken::PurchaseRequest { drink } => {
                let result =
                    purchase::buy_by_button(&self.store, &self.ledger, presser.platform_id, drink)
                        .await;
                match result {
                    Ok(receipt) => {
                        metrics::record_purchase("ok");
                        vec![
                            answer(query_id, receipt.ack),
                            Render::EditMessage {
                                message,
                                text: receipt.text,
                                keyboard: receipt.keyboard,
                            },
                        ]
                    }
                    // The catalog message stays actionable: answer the
                    // press, leave the keyboard alone.
                    Err(e) => {
                        metrics::record_purchase(e.kind());
                        vec![answer(query_id, self.render_error(&e))]
                    }
                }
            }
            _ => match handshake::resolve(&self.store, presser, &token) {
                Ok(resolution) => {
                    metrics::record_handshake("ok");
                    vec![
                        Render::EditMessage {
                            message,
                            text: resolution.final_text,
                            keyboard: None,
                        },
                        answer(query_id, resolution.ack),
                    ]
                }
                // An internal fault must not burn the pending action, so
                // the message is left as-is for a later retry.
                Err(e @ BotError::Internal(_)) => {
                    metrics::record_handshake(e.kind());
                    vec![answer(query_id, self.render_error(&e))]
                }
                // Expected terminal outcomes rewrite the message in place
                // so it stops being actionable.
                Err(e) => {
                    metrics::record_handshake(e.kind());
                    let text = self.render_error(&e);
                    vec![
                        Render::EditMessage {
                            message,
                            text,
                            keyboard: None,
                        },
                        answer(query_id, self.render_error(&e)),
                    ]
                }
            },
        }
    }

    /// Fixed user-facing text per outcome. Internal faults additionally go
    /// to the operator log here, so no caller can forget to report them.
    fn render_error(&self, err: &BotError) -> String {
        match err {
            BotError::NotLinked => {
                let admins = self
                    .store
                    .admin_handles()
                    .ok()
                    .filter(|a| !a.is_empty())
                    .map(|a| a.into_iter().collect::<Vec<_>>().join(", "))
                    .map(|a| format!(" Ask one of: {}", a))
                    .unwrap_or_default();
                format!("You are not linked to a ledger account yet.{}", admins)
            }
            BotError::AlreadyLinked => {
                "This chat identity is already linked to an account.".to_string()
            }
            BotError::AccountAlreadyLinked => {
                "That ledger account is already linked to someone else.".to_string()
            }
            BotError::AlreadyAdmin => "Already an administrator.".to_string(),
            BotError::NoHandle => {
                "A public handle is required to become an administrator.".to_string()
            }
            BotError::UnknownAccount(id) => format!("No ledger account with id {}.", id),
            BotError::UnknownDrink => CONFUSED.to_string(),
            BotError::Cancelled => "Action cancelled.".to_string(),
            BotError::UpstreamUnavailable => {
                "The ledger service is unreachable right now. Try again later.".to_string()
            }
            BotError::MalformedToken => "This button is no longer valid.".to_string(),
            BotError::Internal(detail) => {
                tracing::error!(detail = %detail, "Unexpected fault while handling event");
                INTERNAL.to_string()
            }
        }
    }
}

fn send(chat: ChatRef, text: String, keyboard: Option<Keyboard>) -> Render {
    Render::SendMessage {
        chat,
        text,
        keyboard,
    }
}

fn answer(query_id: String, text: String) -> Render {
    Render::AnswerButtonPress { query_id, text }
}
