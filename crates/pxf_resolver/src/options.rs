//! Options for configuring a resolver for a fragment.
use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{ResolverError, Result};
use crate::metadata::DEFAULT_METADATA_DELIMITER;
use crate::partition::DescriptorFormat;

/// User property holding the output field delimiter.
pub const DELIMITER_OPTION: &str = "DELIMITER";

/// String emitted in place of a null partition value.
pub const DEFAULT_NULL_STRING: &str = "\\N";

/// What to do when a partition value contains the output delimiter.
///
/// The consumer re-splits the final row on the delimiter, so a value
/// containing it shifts every column after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionValuePolicy {
    /// Append the value verbatim and log a warning.
    #[default]
    PassThrough,
    /// Fail fragment initialization.
    Reject,
    /// Backslash-escape the delimiter and backslashes in the value.
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Delimiter between fields in the output row.
    #[serde(deserialize_with = "deserialize_delimiter")]
    pub delimiter: char,
    /// Delimiter between tokens in the fragment metadata. Agreed upon with the
    /// fragment planner.
    pub metadata_delimiter: String,
    /// Encoding of the partition key descriptor token.
    pub descriptor_format: DescriptorFormat,
    pub null_string: String,
    pub partition_value_policy: PartitionValuePolicy,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            delimiter: ',',
            metadata_delimiter: DEFAULT_METADATA_DELIMITER.to_string(),
            descriptor_format: DescriptorFormat::default(),
            null_string: DEFAULT_NULL_STRING.to_string(),
            partition_value_policy: PartitionValuePolicy::default(),
        }
    }
}

impl ResolverOptions {
    /// Build options from user-supplied properties.
    ///
    /// `DELIMITER` is required. Everything else uses defaults.
    pub fn from_user_properties(props: &HashMap<String, String>) -> Result<Self> {
        let delim = props
            .get(DELIMITER_OPTION)
            .ok_or(ResolverError::MissingOption(DELIMITER_OPTION))?;

        Ok(ResolverOptions {
            delimiter: parse_delimiter(delim)?,
            ..Default::default()
        })
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_descriptor_format(mut self, format: DescriptorFormat) -> Self {
        self.descriptor_format = format;
        self
    }

    pub fn with_partition_value_policy(mut self, policy: PartitionValuePolicy) -> Self {
        self.partition_value_policy = policy;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.metadata_delimiter.is_empty() {
            return Err(ResolverError::InvalidOption {
                option: "metadata_delimiter",
                reason: "delimiter cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a delimiter option.
///
/// Accepts either a single character, or a hex escape of the form `\xHH`.
pub fn parse_delimiter(s: &str) -> Result<char> {
    const HEX_LEN: usize = 4;

    let invalid = |reason: String| ResolverError::InvalidOption {
        option: DELIMITER_OPTION,
        reason,
    };

    if let Some(hex) = s.strip_prefix("\\x") {
        if s.len() != HEX_LEN {
            return Err(invalid(format!("invalid hexadecimal value '{s}'")));
        }
        let b = u8::from_str_radix(hex, 16)
            .map_err(|e| invalid(format!("invalid hexadecimal value '{s}': {e}")))?;
        return Ok(b as char);
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(invalid(format!("expected a single character, got '{s}'"))),
    }
}

fn deserialize_delimiter<'de, D>(deserializer: D) -> std::result::Result<char, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_delimiter(&s).map_err(serde::de::Error::custom)
}
