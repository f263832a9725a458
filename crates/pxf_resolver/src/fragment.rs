//! Fragments as listed by the fragment planner.
//!
//! The planner responds with a json document of the form:
//!
//! ```text
//! {"PXFFragments":[{"sourceName":"a.txt","hosts":["h1","h2"],"userData":"..."}, ...]}
//! ```
use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;

use crate::errors::{ResolverError, Result};
use crate::metadata::FragmentMetadata;

#[derive(Debug, Deserialize)]
struct FragmentsResponse {
    #[serde(rename = "PXFFragments")]
    fragments: Vec<FragmentEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FragmentEntry {
    source_name: String,
    #[serde(default)]
    hosts: Vec<String>,
    #[serde(default)]
    user_data: Option<String>,
}

/// A single fragment to be read by a resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFragment {
    pub source_name: String,
    /// Position of this fragment within its source.
    pub index: usize,
    /// Hosts holding a replica of the fragment.
    pub hosts: Vec<String>,
    /// Opaque metadata for the resolver.
    pub user_data: Option<Bytes>,
}

impl DataFragment {
    /// Decode this fragment's metadata.
    pub fn metadata(&self, delimiter: &str) -> Result<FragmentMetadata> {
        let data = self.user_data.as_ref().ok_or_else(|| {
            ResolverError::MalformedMetadata(format!(
                "fragment {} of '{}' has no metadata",
                self.index, self.source_name
            ))
        })?;
        FragmentMetadata::try_decode(data, delimiter)
    }
}

/// Parse the planner's fragment listing.
///
/// Fragments are indexed per source, the index restarting whenever the
/// source name changes. Fragments without any hosts (e.g. empty files) are
/// dropped, but still consume an index.
pub fn parse_fragments_response(json: &str) -> Result<Vec<DataFragment>> {
    let resp: FragmentsResponse = serde_json::from_str(json)?;

    let mut fragments = Vec::with_capacity(resp.fragments.len());
    let mut curr_source: Option<String> = None;
    let mut curr_index = 0;

    for entry in resp.fragments {
        if curr_source.as_deref() != Some(entry.source_name.as_str()) {
            debug!(
                new_source = %entry.source_name,
                old_source = ?curr_source,
                "new fragment source"
            );
            curr_source = Some(entry.source_name.clone());
            curr_index = 0;
        }

        let index = curr_index;
        curr_index += 1;

        if entry.hosts.is_empty() {
            debug!(source = %entry.source_name, index, "skipping fragment without hosts");
            continue;
        }

        fragments.push(DataFragment {
            source_name: entry.source_name,
            index,
            hosts: entry.hosts,
            user_data: entry.user_data.map(Bytes::from),
        });
    }

    Ok(fragments)
}
