//! Partition handling shared between resolvers.
//!
//! Partition columns aren't stored in the rows of a fragment. Instead the
//! fragment planner encodes their values in the fragment's metadata, and the
//! resolver appends them to every row, Hive style.
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{ResolverError, Result};
use crate::options::{PartitionValuePolicy, ResolverOptions};

/// Descriptor value for a table without partitions.
pub const HIVE_NO_PART_TBL: &str = "!HNPT!";
/// Delimiter between partition levels in a Hive descriptor.
pub const HIVE_PARTITIONS_DELIM: &str = "!HPD!";
/// Delimiter between name, type, and value within a single level.
pub const HIVE_1_PART_DELIM: &str = "!H1PD!";
/// Value Hive uses for rows whose partition column is null.
pub const HIVE_DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// How the partition key descriptor is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorFormat {
    /// `name!H1PD!type!H1PD!value` levels joined by `!HPD!`.
    #[default]
    Hive,
    /// `names|types|values` with each section being a comma separated list.
    Sectioned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionColumn {
    pub name: String,
    /// Type name as provided by the planner. Not interpreted.
    pub type_name: String,
    /// Serialized value.
    pub value: String,
}

impl PartitionColumn {
    pub fn is_default_partition(&self) -> bool {
        self.value == HIVE_DEFAULT_PARTITION
    }
}

impl DescriptorFormat {
    /// Parse partition columns from a descriptor.
    ///
    /// Columns are returned in the order they appear.
    pub fn parse(&self, descriptor: &str) -> Result<Vec<PartitionColumn>> {
        match self {
            Self::Hive => parse_hive_descriptor(descriptor),
            Self::Sectioned => parse_sectioned_descriptor(descriptor),
        }
    }
}

fn parse_hive_descriptor(descriptor: &str) -> Result<Vec<PartitionColumn>> {
    if descriptor == HIVE_NO_PART_TBL {
        return Ok(Vec::new());
    }

    descriptor
        .split(HIVE_PARTITIONS_DELIM)
        .map(|level| {
            let mut parts = level.split(HIVE_1_PART_DELIM);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(name), Some(type_name), Some(value)) => Ok(PartitionColumn {
                    name: name.to_string(),
                    type_name: type_name.to_string(),
                    value: value.to_string(),
                }),
                _ => Err(ResolverError::MalformedMetadata(format!(
                    "partition level '{level}' is not of the form name{HIVE_1_PART_DELIM}type{HIVE_1_PART_DELIM}value"
                ))),
            }
        })
        .collect()
}

fn parse_sectioned_descriptor(descriptor: &str) -> Result<Vec<PartitionColumn>> {
    const SECTION_DELIM: char = '|';
    const LIST_DELIM: char = ',';

    let sections: Vec<&str> = descriptor.split(SECTION_DELIM).collect();
    let [names, types, values] = sections.as_slice() else {
        return Err(ResolverError::MalformedMetadata(format!(
            "expected 3 sections in partition descriptor, got {}",
            sections.len()
        )));
    };

    if names.is_empty() && types.is_empty() && values.is_empty() {
        return Ok(Vec::new());
    }

    let names: Vec<&str> = names.split(LIST_DELIM).collect();
    let types: Vec<&str> = types.split(LIST_DELIM).collect();
    let values: Vec<&str> = values.split(LIST_DELIM).collect();

    if names.len() != types.len() || names.len() != values.len() {
        return Err(ResolverError::MalformedMetadata(format!(
            "partition descriptor has {} names, {} types, and {} values",
            names.len(),
            types.len(),
            values.len()
        )));
    }

    Ok(names
        .into_iter()
        .zip(types)
        .zip(values)
        .map(|((name, type_name), value)| PartitionColumn {
            name: name.to_string(),
            type_name: type_name.to_string(),
            value: value.to_string(),
        })
        .collect())
}

/// Build the string to append to every row of a fragment.
///
/// Each column contributes the delimiter followed by its value. No type
/// conversion happens, values are kept in their serialized form.
pub fn materialize(
    columns: &[PartitionColumn],
    delimiter: char,
    null_string: &str,
    policy: PartitionValuePolicy,
) -> Result<String> {
    let mut suffix = String::new();

    for col in columns {
        suffix.push(delimiter);

        if col.is_default_partition() {
            suffix.push_str(null_string);
            continue;
        }

        match policy {
            PartitionValuePolicy::Escape => escape_into(&mut suffix, &col.value, delimiter),
            PartitionValuePolicy::PassThrough => {
                if col.value.contains(delimiter) {
                    warn!(
                        column = %col.name,
                        value = %col.value,
                        %delimiter,
                        "partition value contains output delimiter, consumer will see shifted columns"
                    );
                }
                suffix.push_str(&col.value);
            }
            PartitionValuePolicy::Reject => {
                if col.value.contains(delimiter) {
                    return Err(ResolverError::AmbiguousPartitionValue {
                        column: col.name.clone(),
                        value: col.value.clone(),
                        delimiter,
                    });
                }
                suffix.push_str(&col.value);
            }
        }
    }

    Ok(suffix)
}

fn escape_into(buf: &mut String, value: &str, delimiter: char) {
    for c in value.chars() {
        if c == delimiter || c == '\\' {
            buf.push('\\');
        }
        buf.push(c);
    }
}

/// Partition values for a single fragment.
///
/// Built once when the fragment is opened, then used to project every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionProjector {
    columns: Vec<PartitionColumn>,
    suffix: String,
}

impl PartitionProjector {
    pub fn try_new(descriptor: &str, opts: &ResolverOptions) -> Result<Self> {
        let columns = opts.descriptor_format.parse(descriptor)?;
        let suffix = materialize(
            &columns,
            opts.delimiter,
            &opts.null_string,
            opts.partition_value_policy,
        )?;

        debug!(num_partitions = columns.len(), %suffix, "materialized partition values");

        Ok(PartitionProjector { columns, suffix })
    }

    /// Projector for a fragment with no partition columns.
    pub fn empty() -> Self {
        PartitionProjector {
            columns: Vec::new(),
            suffix: String::new(),
        }
    }

    pub fn columns(&self) -> &[PartitionColumn] {
        &self.columns
    }

    pub fn num_partitions(&self) -> usize {
        self.columns.len()
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Append partition values to the end of a row.
    pub fn project(&self, content: &str) -> String {
        let mut out = String::with_capacity(content.len() + self.suffix.len());
        out.push_str(content);
        out.push_str(&self.suffix);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, type_name: &str, value: &str) -> PartitionColumn {
        PartitionColumn {
            name: name.to_string(),
            type_name: type_name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn parse_hive_no_partitions() {
        assert_eq!(
            Vec::<PartitionColumn>::new(),
            DescriptorFormat::Hive.parse(HIVE_NO_PART_TBL).unwrap()
        );
    }

    #[test]
    fn parse_hive_empty_descriptor() {
        // Only the explicit marker means no partitions.
        let err = DescriptorFormat::Hive.parse("").unwrap_err();
        assert!(matches!(err, ResolverError::MalformedMetadata(_)));
    }

    #[test]
    fn parse_hive_multiple_levels() {
        let desc = "year!H1PD!int!H1PD!2020!HPD!month!H1PD!string!H1PD!jan";
        let cols = DescriptorFormat::Hive.parse(desc).unwrap();

        assert_eq!(
            vec![col("year", "int", "2020"), col("month", "string", "jan")],
            cols
        );
    }

    #[test]
    fn parse_hive_empty_value() {
        let desc = "a!H1PD!string!H1PD!!HPD!b!H1PD!string!H1PD!x";
        let cols = DescriptorFormat::Hive.parse(desc).unwrap();

        assert_eq!(vec![col("a", "string", ""), col("b", "string", "x")], cols);
    }

    #[test]
    fn parse_hive_missing_value() {
        let err = DescriptorFormat::Hive.parse("year!H1PD!int").unwrap_err();
        assert!(matches!(err, ResolverError::MalformedMetadata(_)));
    }

    #[test]
    fn parse_sectioned() {
        let desc = "year=2020,month=jan|type=string,type=string|2020,jan";
        let cols = DescriptorFormat::Sectioned.parse(desc).unwrap();

        assert_eq!(
            vec![
                col("year=2020", "type=string", "2020"),
                col("month=jan", "type=string", "jan")
            ],
            cols
        );
    }

    #[test]
    fn parse_sectioned_no_partitions() {
        assert!(DescriptorFormat::Sectioned.parse("||").unwrap().is_empty());
    }

    #[test]
    fn parse_sectioned_empty_descriptor() {
        let err = DescriptorFormat::Sectioned.parse("").unwrap_err();
        assert!(matches!(err, ResolverError::MalformedMetadata(_)));
    }

    #[test]
    fn parse_sectioned_mismatched_lengths() {
        let err = DescriptorFormat::Sectioned.parse("a,b|string|1,2").unwrap_err();
        assert!(matches!(err, ResolverError::MalformedMetadata(_)));
    }

    #[test]
    fn parse_sectioned_wrong_section_count() {
        let err = DescriptorFormat::Sectioned.parse("a|string").unwrap_err();
        assert!(matches!(err, ResolverError::MalformedMetadata(_)));
    }

    #[test]
    fn materialize_keeps_order() {
        let cols = vec![
            col("z", "string", "last"),
            col("a", "string", "first"),
            col("m", "string", ""),
        ];
        let suffix = materialize(&cols, '|', "\\N", PartitionValuePolicy::PassThrough).unwrap();
        assert_eq!("|last|first|", suffix);
    }

    #[test]
    fn materialize_empty() {
        let suffix = materialize(&[], ',', "\\N", PartitionValuePolicy::Reject).unwrap();
        assert_eq!("", suffix);
    }

    #[test]
    fn materialize_default_partition() {
        let cols = vec![
            col("year", "int", HIVE_DEFAULT_PARTITION),
            col("month", "string", "jan"),
        ];
        let suffix = materialize(&cols, ',', "\\N", PartitionValuePolicy::PassThrough).unwrap();
        assert_eq!(",\\N,jan", suffix);
    }

    #[test]
    fn materialize_delimiter_in_value() {
        let cols = vec![col("city", "string", "a,b\\c")];

        let suffix = materialize(&cols, ',', "\\N", PartitionValuePolicy::PassThrough).unwrap();
        assert_eq!(",a,b\\c", suffix);

        let suffix = materialize(&cols, ',', "\\N", PartitionValuePolicy::Escape).unwrap();
        assert_eq!(",a\\,b\\\\c", suffix);

        let err = materialize(&cols, ',', "\\N", PartitionValuePolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            ResolverError::AmbiguousPartitionValue { delimiter: ',', .. }
        ));
    }

    #[test]
    fn projector_appends_suffix() {
        let opts = ResolverOptions::default()
            .with_descriptor_format(DescriptorFormat::Sectioned)
            .with_delimiter(',');
        let projector = PartitionProjector::try_new("a,b|string,string|1,2", &opts).unwrap();

        assert_eq!(2, projector.num_partitions());
        assert_eq!(",1,2", projector.suffix());
        assert_eq!("x,y,1,2", projector.project("x,y"));
    }

    #[test]
    fn projector_empty() {
        let projector = PartitionProjector::empty();
        assert_eq!("row", projector.project("row"));
    }
}
