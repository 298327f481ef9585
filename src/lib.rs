//! Shared library for the rolecraft role hierarchy renderer.
//!
//! Role kinds form single-inheritance chains, declare contracts they fulfil,
//! and expose capabilities that render lines of text. A kind's effective
//! capability list is resolved once when it is defined: base entries first
//! (overrides replace them in place), then own capabilities, then the
//! capabilities that fulfil declared contracts in contract order. Rendering is
//! pure and never fails; only definitions can be rejected.
//!
//! Kinds are built in code through [`KindSpec`] or loaded from a JSON catalog
//! with [`load_registry`].

pub mod catalog;
pub mod demo;
pub mod error;
pub mod instance;
pub mod record;
pub mod render;
pub mod runtime;
mod schema_loader;

pub use catalog::{
    Capability, CapabilityName, Contract, ContractName, EffectiveCapability, FieldSpec,
    FieldType, FieldValue, KindName, KindSpec, LoadedCatalog, RoleCatalog, RoleKind,
    RoleRegistry, build_registry, load_catalog_from_path, load_registry,
};
pub use demo::{Scene, SceneOutput, builtin_registry, builtin_scenes, play, transcript};
pub use error::{DefinitionError, InstantiateError};
pub use instance::RoleInstance;
pub use record::{RENDER_SCHEMA_VERSION, RenderRecord, RenderedCapability};
pub use render::{RenderContext, render_all, render_record};

/// Split comma- or whitespace-delimited configuration lists into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::split_list;

    #[test]
    fn split_list_accepts_commas_and_spaces() {
        assert_eq!(split_list("Dog, Cat  Student"), ["Dog", "Cat", "Student"]);
        assert!(split_list(" , ").is_empty());
    }
}
