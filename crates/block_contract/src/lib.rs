//! Shared contract types between dashboard hosts, data-source blocks, and the dashboard UI.
//!
//! A block is one dashboard card bound to one data source. Hosts (the desktop shell and the
//! server variant) build block sources from a [`BlockRegistry`] and exchange results with the UI
//! through the [`BlockResponse`] and [`BlockUpdate`] envelopes defined here.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod registry;
mod settings;
mod source;
mod wire;

use serde::{Deserialize, Serialize};

pub use registry::{BlockFactory, BlockRegistration, BlockRegistry, RegistryError};
pub use settings::BlockSettings;
pub use source::{BlockSource, FetchError};
pub use wire::{BlockResponse, BlockUpdate};

const MAX_BLOCK_ID_LEN: usize = 32;

/// Stable identifier for a block type (`clock`, `emails`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Returns a block identifier when `raw` is a lowercase snake_case token.
    ///
    /// # Errors
    ///
    /// Returns a message describing the policy when `raw` is empty, too long, or contains
    /// characters other than `a-z`, `0-9`, and `_` (the first character must be a letter).
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_block_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!(
                "invalid block id `{raw}`; expected lowercase snake_case up to {MAX_BLOCK_ID_LEN} bytes"
            ))
        }
    }

    /// Creates an id without validation for compile-time trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_block_id(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_BLOCK_ID_LEN {
        return false;
    }
    if !bytes[0].is_ascii_lowercase() {
        return false;
    }
    bytes
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'_')
}

/// Static metadata describing a block type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    /// Stable block identifier.
    pub id: BlockId,
    /// Title shown in the card header and the sidebar toggle list.
    pub title: String,
    /// Short card code rendered as a header badge (`CLK-01`).
    pub code: String,
    /// Refresh cadence in seconds.
    pub refresh_secs: u64,
}

impl BlockDescriptor {
    /// Builds a descriptor from trusted constants.
    pub fn new(id: &str, title: &str, code: &str, refresh_secs: u64) -> Self {
        Self {
            id: BlockId::trusted(id),
            title: title.to_string(),
            code: code.to_string(),
            refresh_secs: refresh_secs.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn block_id_accepts_snake_case_tokens() {
        for raw in ["clock", "emails", "github_notifs", "a1"] {
            assert_eq!(BlockId::new(raw).expect("valid id").as_str(), raw);
        }
    }

    #[test]
    fn block_id_rejects_invalid_tokens() {
        for raw in [
            "",
            "Clock",
            "1clock",
            "clock-face",
            "clock.face",
            "x".repeat(33).as_str(),
        ] {
            assert!(BlockId::new(raw).is_err(), "`{raw}` should be rejected");
        }
    }

    #[test]
    fn block_id_serializes_as_plain_string() {
        let id = BlockId::trusted("weather");
        assert_eq!(
            serde_json::to_string(&id).expect("serialize"),
            "\"weather\""
        );
        let parsed: BlockId = serde_json::from_str("\"movies\"").expect("deserialize");
        assert_eq!(parsed, BlockId::trusted("movies"));
    }

    #[test]
    fn descriptor_refresh_interval_is_at_least_one_second() {
        let descriptor = BlockDescriptor::new("clock", "Clock", "CLK-01", 0);
        assert_eq!(descriptor.refresh_secs, 1);
    }
}
