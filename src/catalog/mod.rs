//! Role catalog wiring.
//!
//! The in-memory model (`model`) and the name-keyed registry (`registry`) are
//! the core; `document` and `loader` add JSON catalog files validated against
//! `schema/role_catalog.schema.json`. Identifiers live in `identity`.

pub mod document;
pub mod identity;
pub mod loader;
pub mod model;
pub mod registry;
pub mod template;

pub use document::{
    CATALOG_SCHEMA_VERSION, CapabilityEntry, ContractEntry, KindEntry, LineStep,
    RequirementEntry, RoleCatalog, load_catalog_from_path,
};
pub use identity::{CapabilityName, ContractName, FieldType, FieldValue, KindName};
pub use loader::{LoadedCatalog, build_registry, load_registry};
pub use model::{
    Capability, Contract, EffectiveCapability, FieldSpec, KindSpec, RenderFn, Requirement,
    RoleKind,
};
pub use registry::RoleRegistry;
pub use template::Template;
