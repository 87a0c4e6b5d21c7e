//! Taint mapping

use strata_common::model::NodeGroupTaint;

use crate::resource::{Taint, TaintEffect};

/// Map configured taints onto the node group schema
///
/// Fails on the first effect outside the closed set; no partial list is
/// returned.
pub fn map_taints(taints: &[NodeGroupTaint]) -> Result<Vec<Taint>, String> {
    taints
        .iter()
        .map(|t| {
            Ok(Taint {
                key: t.key.clone(),
                value: t.value.clone(),
                effect: t.effect.parse::<TaintEffect>()?,
            })
        })
        .collect()
}
