// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifiers that cross the wire: account addresses, entity keys, grid
//! positions and detached signatures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failure to parse an identifier from its text form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    /// Address is not `0x` followed by 40 hex digits.
    #[error("invalid address: {0:?}")]
    Address(String),
    /// Numeric key or coordinate is not decimal/`0x` hex or does not fit.
    #[error("invalid number: {0:?}")]
    Number(String),
    /// Hex blob could not be decoded.
    #[error("invalid hex: {0:?}")]
    Hex(String),
}

/// 20-byte account address, kept in canonical lowercase `0x…` form so that
/// equality is case-insensitive on input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Build an address from its raw 20 bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Canonical text form (`0x` + 40 lowercase hex digits).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| IdError::Address(s.to_string()))?;
        if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::Address(s.to_string()));
        }
        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for Address {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-issued entity key (seekers, seeds). Keys arrive as decimal or
/// `0x` hex text; two spellings of the same number are the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityKey(u64);

impl EntityKey {
    /// Wrap a numeric key.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Numeric value of the key.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl FromStr for EntityKey {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_uint(s).map(Self)
    }
}

impl TryFrom<String> for EntityKey {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityKey> for String {
    fn from(value: EntityKey) -> Self {
        value.to_string()
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Parse an unsigned integer written in decimal or `0x` hex.
pub fn parse_uint(s: &str) -> Result<u64, IdError> {
    let t = s.trim();
    let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        Some(digits) if digits.is_empty() => Ok(0),
        Some(digits) => u64::from_str_radix(digits, 16),
        None => t.parse::<u64>(),
    };
    parsed.map_err(|_| IdError::Number(s.to_string()))
}

/// Parse a grid coordinate (decimal, optionally negative, or `0x` hex).
pub fn parse_coord(s: &str) -> Result<i32, IdError> {
    let t = s.trim();
    let wide = if let Some(neg) = t.strip_prefix('-') {
        neg.parse::<i64>().map(|v| -v).ok()
    } else {
        parse_uint(t).ok().and_then(|v| i64::try_from(v).ok())
    };
    wide.and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| IdError::Number(s.to_string()))
}

/// Integer grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPos {
    /// Construct a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position shifted by `(dx, dy)`, saturating at the `i32` edges.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Chebyshev (king-move) distance to `other`.
    pub fn chebyshev(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Detached signature bytes, carried as `0x` hex on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    /// Parse `0x`-prefixed (or bare) hex.
    pub fn from_hex(s: &str) -> Result<Self, IdError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(digits)
            .map(Self)
            .map_err(|_| IdError::Hex(s.to_string()))
    }
}
