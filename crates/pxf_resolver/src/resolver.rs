//! Resolvers turning physical rows into fields for the consumer.
//!
//! Resolver variants share partition handling through [`PartitionProjector`]
//! and differ in how they turn row content into fields. The variant is picked
//! with [`ResolverKind`].
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use tracing::{debug, trace};

use crate::errors::{ResolverError, Result};
use crate::field::OutputField;
use crate::metadata::FragmentMetadata;
use crate::options::ResolverOptions;
use crate::partition::PartitionProjector;
use crate::row::{RawRow, RowSource};

/// Hook for setting up a format specific deserializer for a fragment.
pub type FormatInitHook = fn(&FragmentMetadata, &ResolverOptions) -> Result<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverKind {
    /// Emits the row text with partition values appended as a single varchar
    /// field. The consumer splits fields itself.
    StringPass,
}

impl ResolverKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StringPass => "string_pass",
        }
    }

    /// Format initialization to run when opening a fragment.
    ///
    /// Text rows are passed through untouched, so there's nothing to set up.
    pub const fn format_init_hook(&self) -> Option<FormatInitHook> {
        match self {
            Self::StringPass => None,
        }
    }
}

impl Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolverKind {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "string_pass" | "HiveStringPassResolver" => Self::StringPass,
            other => {
                return Err(ResolverError::InvalidOption {
                    option: "resolver",
                    reason: format!("unknown resolver '{other}'"),
                });
            }
        })
    }
}

/// Resolves rows for a single fragment.
///
/// State is set once when the fragment is opened. Resolvers for different
/// fragments share nothing and can be used from different threads.
pub trait RowResolver: Debug + Sync + Send {
    fn kind(&self) -> ResolverKind;

    fn partitions(&self) -> &PartitionProjector;

    /// Resolve a single row into fields.
    fn resolve(&self, row: &RawRow) -> Result<Vec<OutputField>>;
}

/// Create a resolver for a fragment.
///
/// Errors here mean the metadata doesn't match what the fragment planner is
/// expected to produce. The fragment shouldn't be retried.
pub fn create_resolver(
    kind: ResolverKind,
    metadata: &[u8],
    opts: &ResolverOptions,
) -> Result<Box<dyn RowResolver>> {
    opts.validate()?;
    let metadata = FragmentMetadata::try_decode(metadata, &opts.metadata_delimiter)?;

    if let Some(hook) = kind.format_init_hook() {
        hook(&metadata, opts)?;
    }

    let resolver: Box<dyn RowResolver> = match kind {
        ResolverKind::StringPass => Box::new(StringPassResolver::from_metadata(&metadata, opts)?),
    };

    debug!(
        %kind,
        num_partitions = resolver.partitions().num_partitions(),
        serde = ?metadata.serde_name(),
        "created resolver for fragment"
    );

    Ok(resolver)
}

/// Resolver for text rows that the consumer parses itself.
///
/// Always produces exactly one varchar field per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringPassResolver {
    partitions: PartitionProjector,
}

impl StringPassResolver {
    pub fn try_new(metadata: &[u8], opts: &ResolverOptions) -> Result<Self> {
        opts.validate()?;
        let metadata = FragmentMetadata::try_decode(metadata, &opts.metadata_delimiter)?;
        Self::from_metadata(&metadata, opts)
    }

    pub fn from_metadata(metadata: &FragmentMetadata, opts: &ResolverOptions) -> Result<Self> {
        let partitions = PartitionProjector::try_new(metadata.partition_keys(), opts)?;
        Ok(StringPassResolver { partitions })
    }

    /// Resolve a row without allocating the output vec.
    pub fn resolve_one(&self, row: &RawRow) -> Result<OutputField> {
        let content = row.content()?;
        // Partition values always go at the end of the record.
        Ok(OutputField::varchar(self.partitions.project(content)))
    }
}

impl RowResolver for StringPassResolver {
    fn kind(&self) -> ResolverKind {
        ResolverKind::StringPass
    }

    fn partitions(&self) -> &PartitionProjector {
        &self.partitions
    }

    fn resolve(&self, row: &RawRow) -> Result<Vec<OutputField>> {
        Ok(vec![self.resolve_one(row)?])
    }
}

/// Iterator resolving every row of a fragment.
///
/// Yields one item per row. An error resolving a row doesn't end iteration,
/// the caller decides whether to skip the row or stop. An error from the row
/// source is yielded once, after which iteration ends.
#[derive(Debug)]
pub struct FragmentRows<'a, S> {
    source: S,
    resolver: &'a dyn RowResolver,
    rows_read: u64,
    finished: bool,
}

impl<'a, S: RowSource> FragmentRows<'a, S> {
    pub fn new(source: S, resolver: &'a dyn RowResolver) -> Self {
        FragmentRows {
            source,
            resolver,
            rows_read: 0,
            finished: false,
        }
    }

    /// Number of rows pulled from the source so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }
}

impl<S: RowSource> Iterator for FragmentRows<'_, S> {
    type Item = Result<Vec<OutputField>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let row = match self.source.next_row() {
            Ok(Some(row)) => row,
            Ok(None) => {
                trace!(rows_read = self.rows_read, "fragment exhausted");
                self.finished = true;
                return None;
            }
            Err(e) => {
                debug!(rows_read = self.rows_read, %e, "row source failed, ending fragment");
                self.finished = true;
                return Some(Err(e));
            }
        };
        self.rows_read += 1;

        Some(self.resolver.resolve(&row))
    }
}
