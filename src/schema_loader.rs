//! JSON Schema compilation and validation for catalog files.
//!
//! Schemas are compiled once from their JSON text. The `schema_version` const
//! inside the schema is extracted so callers can reject documents declaring a
//! different version with a readable message before the validator's own
//! (noisier) error.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

/// Result of loading and compiling a JSON Schema.
pub(crate) struct SchemaLoadResult {
    pub schema_version: String,
    pub compiled: JSONSchema,
}

const SCHEMA_VERSION_POINTER: &str = "/properties/schema_version/const";

pub(crate) fn load_json_schema(raw: &str, origin: &str) -> Result<SchemaLoadResult> {
    let schema: Value =
        serde_json::from_str(raw).with_context(|| format!("parsing schema {origin}"))?;

    let schema_version = extract_schema_version(&schema, SCHEMA_VERSION_POINTER)
        .ok_or_else(|| anyhow!("schema {origin} missing schema_version const"))?;

    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("compiling schema {origin}: {err}"))?;

    Ok(SchemaLoadResult {
        schema_version,
        compiled,
    })
}

/// Validate `value`, joining every schema violation into one error.
pub(crate) fn validate_against(schema: &SchemaLoadResult, value: &Value, what: &str) -> Result<()> {
    if let Err(errors) = schema.compiled.validate(value) {
        let details = errors
            .map(|err| format!("{err} (at {})", err.instance_path))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("{what} failed schema validation:\n{details}");
    }
    Ok(())
}

pub(crate) fn is_version_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn extract_schema_version(schema: &Value, pointer: &str) -> Option<String> {
    let version = schema.pointer(pointer).and_then(Value::as_str)?;
    if is_version_token(version) {
        Some(version.to_string())
    } else {
        None
    }
}
