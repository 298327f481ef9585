//! Deserializable representation of a role catalog file.
//!
//! The types mirror `schema/role_catalog.schema.json`. Use
//! [`crate::catalog::load_registry`] to validate a file and turn it into a
//! [`crate::RoleRegistry`]; use these structs when the raw declarations are
//! needed.

use crate::catalog::identity::{CapabilityName, ContractName, KindName};
use crate::catalog::model::FieldSpec;
use crate::demo::Scene;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CATALOG_SCHEMA_VERSION: &str = "role_catalog_v1";

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Full catalog as stored on disk.
pub struct RoleCatalog {
    pub schema_version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contracts: Vec<ContractEntry>,
    pub kinds: Vec<KindEntry>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractEntry {
    pub name: ContractName,
    #[serde(default)]
    pub requires: Vec<RequirementEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
/// Required signature: a bare name, or a full capability used as the default.
pub enum RequirementEntry {
    Name(CapabilityName),
    WithDefault(CapabilityEntry),
}

impl RequirementEntry {
    pub fn name(&self) -> &CapabilityName {
        match self {
            RequirementEntry::Name(name) => name,
            RequirementEntry::WithDefault(entry) => &entry.name,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Kind declaration; `extends` must name a kind declared earlier in the file.
pub struct KindEntry {
    pub name: KindName,
    #[serde(default)]
    pub extends: Option<KindName>,
    #[serde(default)]
    pub fulfils: Vec<ContractName>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub capabilities: Vec<CapabilityEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapabilityEntry {
    pub name: CapabilityName,
    #[serde(default)]
    pub replaces: Option<CapabilityName>,
    pub lines: Vec<LineStep>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// One step of a catalog capability's output.
pub enum LineStep {
    /// One line from a `{field}` template.
    Text(String),
    /// All lines of the named capability as the base kind renders it.
    CallBase(CapabilityName),
}

/// Read and parse a catalog from disk without additional validation.
pub fn load_catalog_from_path(path: &Path) -> Result<RoleCatalog> {
    let data = fs::read_to_string(path)?;
    let catalog: RoleCatalog = serde_json::from_str(&data)?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requirement_accepts_name_or_default() {
        let entry: ContractEntry = serde_json::from_value(json!({
            "name": "Showable",
            "requires": [
                "show",
                {"name": "preview", "lines": [{"text": "Previewing..."}]}
            ]
        }))
        .unwrap();
        assert_eq!(entry.requires.len(), 2);
        assert!(matches!(entry.requires[0], RequirementEntry::Name(_)));
        match &entry.requires[1] {
            RequirementEntry::WithDefault(cap) => {
                assert_eq!(cap.name.as_str(), "preview");
                assert_eq!(cap.lines, vec![LineStep::Text("Previewing...".into())]);
            }
            other => panic!("expected default capability, got {other:?}"),
        }
    }

    #[test]
    fn line_steps_use_snake_case_tags() {
        let steps: Vec<LineStep> = serde_json::from_value(json!([
            {"call_base": "displayPerson"},
            {"text": "Student ID: {studentId}"}
        ]))
        .unwrap();
        assert_eq!(
            steps,
            vec![
                LineStep::CallBase("displayPerson".into()),
                LineStep::Text("Student ID: {studentId}".into()),
            ]
        );
    }
}
