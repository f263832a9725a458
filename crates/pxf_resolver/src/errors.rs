#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// Fragment metadata doesn't match what the fragment planner is expected
    /// to produce. Fatal to the fragment.
    #[error("Malformed fragment metadata: {0}")]
    MalformedMetadata(String),

    /// Content for a single row couldn't be read. Fatal to that row only.
    #[error("Failed to read row: {0}")]
    RowRead(String),

    #[error("Invalid option '{option}': {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    #[error("Missing required option: {0}")]
    MissingOption(&'static str),

    #[error(
        "Value '{value}' for partition column '{column}' contains the output delimiter '{delimiter}'"
    )]
    AmbiguousPartitionValue {
        column: String,
        value: String,
        delimiter: char,
    },

    #[error("Invalid fragment listing: {0}")]
    InvalidFragmentListing(#[from] serde_json::Error),
}

impl ResolverError {
    /// Returns if this error happened while initializing a fragment.
    ///
    /// Initialization errors indicate a contract mismatch with the fragment
    /// planner and should never be retried.
    pub fn is_fragment_fatal(&self) -> bool {
        !matches!(self, ResolverError::RowRead(_))
    }
}

pub type Result<T, E = ResolverError> = std::result::Result<T, E>;
