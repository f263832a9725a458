//! Decoding of the metadata the fragment planner attaches to a fragment.
//!
//! The planner serializes a handful of fields by joining them with a fixed
//! delimiter. Positions are part of the wire contract between the planner and
//! the resolver, any change to them is a breaking change.
use crate::errors::{ResolverError, Result};

/// Delimiter used by the fragment planner between metadata tokens.
pub const DEFAULT_METADATA_DELIMITER: &str = "!HUDD!";

/// Index of the serde (format) name token.
pub const TOK_SERDE: usize = 0;
/// Index of the partition key descriptor token.
pub const TOK_KEYS: usize = 1;
/// Index of the token indicating if the fragment planner already applied
/// the filter to partitions.
pub const TOK_FILTER_DONE: usize = 2;

/// Split a metadata blob into its tokens.
///
/// Splits on every occurrence of `delimiter`, keeping empty tokens. No other
/// processing is done.
pub fn decode_tokens<'a>(blob: &'a str, delimiter: &str) -> Vec<&'a str> {
    blob.split(delimiter).collect()
}

/// Decoded metadata for a single fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentMetadata {
    tokens: Vec<String>,
}

impl FragmentMetadata {
    /// Decode metadata from raw bytes.
    ///
    /// Errors if the bytes aren't valid utf8, or if the partition key
    /// descriptor is missing.
    pub fn try_decode(blob: &[u8], delimiter: &str) -> Result<Self> {
        let s = std::str::from_utf8(blob).map_err(|e| {
            ResolverError::MalformedMetadata(format!("metadata is not valid utf8: {e}"))
        })?;

        let tokens: Vec<String> = decode_tokens(s, delimiter)
            .into_iter()
            .map(|tok| tok.to_string())
            .collect();

        if tokens.len() <= TOK_KEYS {
            return Err(ResolverError::MalformedMetadata(format!(
                "expected partition keys at token {TOK_KEYS}, metadata only has {} token(s)",
                tokens.len()
            )));
        }

        Ok(FragmentMetadata { tokens })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Get the partition key descriptor.
    pub fn partition_keys(&self) -> &str {
        // Presence checked during decode.
        &self.tokens[TOK_KEYS]
    }

    /// Get the serde name if the planner included one.
    pub fn serde_name(&self) -> Option<&str> {
        self.tokens.get(TOK_SERDE).map(|s| s.as_str())
    }

    /// Get whether or not the planner already filtered partitions.
    ///
    /// Returns `None` if the token is absent or isn't a boolean.
    pub fn filter_in_fragmenter(&self) -> Option<bool> {
        self.tokens
            .get(TOK_FILTER_DONE)
            .and_then(|s| s.parse::<bool>().ok())
    }
}
