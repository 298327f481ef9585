//! Serializable types for the `role_render_v1` render record.
//!
//! A record is the structured counterpart of `render_all`: the same lines, but
//! grouped per capability with the kind that supplied each one and the
//! contract it fulfils. The demo binary emits these beside the scene header as
//! NDJSON with `--json`.

use crate::catalog::{CapabilityName, ContractName, KindName};
use serde::{Deserialize, Serialize};

pub const RENDER_SCHEMA_VERSION: &str = "role_render_v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Rendered output of a single instance.
pub struct RenderRecord {
    pub schema_version: String,
    pub kind: KindName,
    /// Instance kind first, root kind last.
    pub lineage: Vec<KindName>,
    pub capabilities: Vec<RenderedCapability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedCapability {
    pub name: CapabilityName,
    pub scope: KindName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<ContractName>,
    pub lines: Vec<String>,
}

impl RenderRecord {
    pub fn new(
        kind: KindName,
        lineage: Vec<KindName>,
        capabilities: Vec<RenderedCapability>,
    ) -> Self {
        Self {
            schema_version: RENDER_SCHEMA_VERSION.to_string(),
            kind,
            lineage,
            capabilities,
        }
    }

    /// Flattened lines in capability order; equal to `render_all`.
    pub fn lines(&self) -> Vec<String> {
        self.capabilities
            .iter()
            .flat_map(|cap| cap.lines.iter().cloned())
            .collect()
    }
}
