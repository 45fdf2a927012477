//! Shared API Types for the genweb editor
//!
//! This crate is the SINGLE SOURCE OF TRUTH for all types crossing the
//! `/api/v1` HTTP boundary.
//!
//! ## Boundaries
//!
//! ```text
//! ┌──────────────────┐         ┌──────────────────┐
//! │  genweb server   │  JSON   │  editor engine   │
//! │  (/api/v1)       │ ◄─────► │  (genweb-editor) │
//! └──────────────────┘         └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. Identifiers are opaque strings, compared byte-for-byte
//! 2. Metadata records stay a JSON object so unknown server fields survive
//! 3. Person relations are identifier references, never embedded records

pub mod metadata;
pub mod person;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use metadata::*;
pub use person::*;

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Opaque unique name of a person or a metadata record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ============================================================================
// POOLS
// ============================================================================

/// The two identifier directories the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    People,
    Metadata,
}

impl Pool {
    pub const ALL: [Pool; 2] = [Pool::People, Pool::Metadata];

    /// Path segment under `/api/v1/`
    pub fn as_str(&self) -> &'static str {
        match self {
            Pool::People => "people",
            Pool::Metadata => "metadata",
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pool {
    type Err = UnknownPool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "people" => Ok(Pool::People),
            "metadata" => Ok(Pool::Metadata),
            other => Err(UnknownPool(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPool(pub String);

impl fmt::Display for UnknownPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pool '{}' (expected people or metadata)", self.0)
    }
}

impl std::error::Error for UnknownPool {}

// ============================================================================
// RECORD TYPES
// ============================================================================

/// Kind of metadata record; drives which form rows are relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Inline,
    Href,
    Picture,
}

impl RecordType {
    pub const ALL: [RecordType; 3] = [RecordType::Inline, RecordType::Href, RecordType::Picture];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Inline => "inline",
            RecordType::Href => "href",
            RecordType::Picture => "picture",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = UnknownRecordType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" => Ok(RecordType::Inline),
            "href" => Ok(RecordType::Href),
            "picture" => Ok(RecordType::Picture),
            other => Err(UnknownRecordType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRecordType(pub String);

impl fmt::Display for UnknownRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown record type '{}'", self.0)
    }
}

impl std::error::Error for UnknownRecordType {}
