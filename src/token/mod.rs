//! Capability tokens carried inside inline-keyboard buttons.
//!
//! # Responsibilities
//! - Describe a pending action entirely inside the button payload
//! - Survive indefinitely: a button may be pressed long after the message
//!   was posted, so the encoding is versioned
//! - Reject unknown or truncated payloads instead of indexing blindly
//!
//! The chat platform returns the payload verbatim on press; no server-side
//! session state backs it. Safety therefore rests on re-validation at
//! confirm time, not on anything stored here.

use thiserror::Error;

use crate::gateway::types::{AccountId, DrinkId};

/// Wire version prefix. Bump when the encoding changes shape.
const VERSION: &str = "v1";

/// A tagged action capability embedded in a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionToken {
    /// Confirm linking the presser to this ledger account.
    LinkRequest { account: AccountId },
    /// Confirm promoting the presser to administrator.
    PromoteRequest,
    /// Dismiss the pending action.
    Cancel,
    /// Charge the presser for this catalog item.
    PurchaseRequest { drink: DrinkId },
}

/// Why a payload failed to decode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unsupported token version '{0}'")]
    UnknownVersion(String),

    #[error("unknown token tag '{0}'")]
    UnknownTag(String),

    #[error("token tag '{tag}' expects {expected} field(s), got {got}")]
    Arity {
        tag: String,
        expected: usize,
        got: usize,
    },

    #[error("token field '{0}' is not a valid id")]
    Field(String),

    #[error("empty token payload")]
    Empty,
}

impl ActionToken {
    /// Serialize to the opaque button payload.
    pub fn encode(&self) -> String {
        match self {
            ActionToken::LinkRequest { account } => format!("{VERSION}:link:{account}"),
            ActionToken::PromoteRequest => format!("{VERSION}:promote"),
            ActionToken::Cancel => format!("{VERSION}:cancel"),
            ActionToken::PurchaseRequest { drink } => format!("{VERSION}:buy:{drink}"),
        }
    }

    /// Parse a payload returned by a button press.
    pub fn decode(payload: &str) -> Result<Self, DecodeError> {
        let mut parts = payload.split(':');
        let version = parts.next().ok_or(DecodeError::Empty)?;
        if version != VERSION {
            return Err(DecodeError::UnknownVersion(version.to_string()));
        }
        let tag = parts
            .next()
            .filter(|t| !t.is_empty())
            .ok_or(DecodeError::Empty)?;
        let fields: Vec<&str> = parts.collect();

        let expect = |n: usize| -> Result<(), DecodeError> {
            if fields.len() == n {
                Ok(())
            } else {
                Err(DecodeError::Arity {
                    tag: tag.to_string(),
                    expected: n,
                    got: fields.len(),
                })
            }
        };

        match tag {
            "link" => {
                expect(1)?;
                let account = parse_id(fields[0])?;
                Ok(ActionToken::LinkRequest {
                    account: AccountId(account),
                })
            }
            "promote" => {
                expect(0)?;
                Ok(ActionToken::PromoteRequest)
            }
            "cancel" => {
                expect(0)?;
                Ok(ActionToken::Cancel)
            }
            "buy" => {
                expect(1)?;
                let drink = parse_id(fields[0])?;
                Ok(ActionToken::PurchaseRequest {
                    drink: DrinkId(drink),
                })
            }
            other => Err(DecodeError::UnknownTag(other.to_string())),
        }
    }
}

fn parse_id(field: &str) -> Result<u32, DecodeError> {
    field
        .parse()
        .map_err(|_| DecodeError::Field(field.to_string()))
}
