//! Ledger gateway types and error definitions.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Ledger account identifier, assigned by the mete service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u32);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrinkId(pub u32);

impl fmt::Display for DrinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed fixed-point currency amount in cents.
///
/// The gateway speaks decimal strings ("1.5", "-3.20"); amounts are stored
/// as integer cents so price comparison and balance arithmetic stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(pub i64);

impl Money {
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Parses a decimal amount with at most two fractional digits.
impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() || frac.len() > 2 {
            return Err(MoneyParseError(s.to_string()));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyParseError(s.to_string()));
        }
        let whole: i64 = whole.parse().map_err(|_| MoneyParseError(s.to_string()))?;
        let mut frac_cents: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| MoneyParseError(s.to_string()))?
        };
        if frac.len() == 1 {
            frac_cents *= 10;
        }
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(|| MoneyParseError(s.to_string()))?;
        Ok(Money(if negative { -cents } else { cents }))
    }
}

/// Invalid decimal amount string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid currency amount '{0}'")]
pub struct MoneyParseError(pub String);

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// One purchasable item, as served by `/api/v1/drinks.json`.
///
/// Never cached: stale prices directly cause mis-charges, so every flow
/// works from a fresh fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: DrinkId,
    pub name: String,
    pub price: Money,
    pub active: bool,
}

/// One ledger account, as served by `/api/v1/users.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub name: String,
    pub balance: Money,
}

/// Errors from the ledger gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection-level failure (DNS, refused, reset).
    #[error("gateway request failed: {0}")]
    Request(String),

    /// The bounded per-request timeout elapsed.
    #[error("gateway request timed out")]
    Timeout,

    /// Non-success HTTP status.
    #[error("gateway returned status {0}")]
    Status(u16),

    /// Response body did not match the expected shape.
    #[error("gateway response could not be decoded: {0}")]
    Decode(String),

    /// The configured base URL is unusable.
    #[error("invalid gateway URL: {0}")]
    Url(String),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
