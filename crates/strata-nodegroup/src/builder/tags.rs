//! Tag merging

use std::collections::BTreeMap;

/// Merge cluster tags under node group tags
///
/// Returns a new map; node group values win on conflicting keys. Neither
/// input is modified, and merging an already-merged map is a no-op.
pub fn merge_tags(
    cluster_tags: &BTreeMap<String, String>,
    nodegroup_tags: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    cluster_tags
        .iter()
        .chain(nodegroup_tags)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
