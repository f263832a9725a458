//! Partition aware row resolution for fragments of Hive style tables.
//!
//! A resolver is created once per fragment from the metadata the fragment
//! planner attached to it. It's then used to turn every physical row of the
//! fragment into fields for the consumer, appending the fragment's partition
//! values to each row.

pub mod errors;
pub mod field;
pub mod fragment;
pub mod metadata;
pub mod options;
pub mod partition;
pub mod resolver;
pub mod row;

pub use errors::{ResolverError, Result};
pub use field::{DataType, OutputField};
pub use options::{PartitionValuePolicy, ResolverOptions};
pub use resolver::{FragmentRows, ResolverKind, RowResolver, StringPassResolver, create_resolver};
pub use row::{LineRowSource, RawRow, RowSource};
