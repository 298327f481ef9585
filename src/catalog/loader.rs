//! Loads a role catalog file into a registry.
//!
//! Loading is strict: the file must pass the embedded JSON Schema, declare the
//! supported `schema_version`, reference only fields its kinds declare, and
//! call through only to capabilities the base actually exposes. Kind
//! resolution errors come from the registry itself.

use crate::catalog::document::{
    CapabilityEntry, LineStep, RequirementEntry, RoleCatalog, load_catalog_from_path,
};
use crate::catalog::identity::CapabilityName;
use crate::catalog::model::{Capability, Contract, KindSpec, RoleKind};
use crate::catalog::registry::RoleRegistry;
use crate::catalog::template::Template;
use crate::demo::Scene;
use crate::schema_loader::{load_json_schema, validate_against};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

const CATALOG_SCHEMA: &str = include_str!("../../schema/role_catalog.schema.json");

/// Registry and demonstration scenes built from one catalog file.
pub struct LoadedCatalog {
    pub registry: RoleRegistry,
    pub scenes: Vec<Scene>,
    pub description: Option<String>,
}

/// Validate a catalog file and build its registry.
pub fn load_registry(path: &Path) -> Result<LoadedCatalog> {
    validate_against_schema(path)?;

    let catalog =
        load_catalog_from_path(path).with_context(|| format!("loading {}", path.display()))?;
    let registry =
        build_registry(&catalog).with_context(|| format!("building kinds from {}", path.display()))?;

    for scene in &catalog.scenes {
        if registry.kind(&scene.kind).is_none() {
            bail!(
                "{} declares a scene for unknown kind {}",
                path.display(),
                scene.kind
            );
        }
    }

    debug!(
        path = %path.display(),
        kinds = catalog.kinds.len(),
        contracts = catalog.contracts.len(),
        scenes = catalog.scenes.len(),
        "loaded role catalog"
    );

    Ok(LoadedCatalog {
        registry,
        scenes: catalog.scenes,
        description: catalog.description,
    })
}

/// Define every contract, then every kind in file order.
pub fn build_registry(catalog: &RoleCatalog) -> Result<RoleRegistry> {
    let mut registry = RoleRegistry::new();

    for entry in &catalog.contracts {
        let mut contract = Contract::new(entry.name.clone());
        for requirement in &entry.requires {
            contract = match requirement {
                RequirementEntry::Name(name) => contract.requires(name.clone()),
                RequirementEntry::WithDefault(cap) => {
                    contract.requires_with_default(compile_capability(cap))
                }
            };
        }
        registry.define_contract(contract)?;
    }

    for entry in &catalog.kinds {
        let base = match &entry.extends {
            Some(base) => Some(registry.kind(base).cloned().with_context(|| {
                format!(
                    "kind {} extends {}, which is not declared earlier in the catalog",
                    entry.name, base
                )
            })?),
            None => None,
        };

        let mut known_fields: BTreeSet<&str> =
            entry.fields.iter().map(|field| field.name.as_str()).collect();
        if let Some(base) = &base {
            for kind in base.lineage() {
                known_fields.extend(kind.own_fields().iter().map(|field| field.name.as_str()));
            }
        }

        let mut spec = KindSpec::new(entry.name.clone());
        if let Some(base) = &entry.extends {
            spec = spec.extends(base.clone());
        }
        for contract in &entry.fulfils {
            spec = spec.fulfils(contract.clone());
        }
        for field in &entry.fields {
            spec = spec.field(field.clone());
        }
        for cap in &entry.capabilities {
            check_capability(entry.name.as_str(), cap, &known_fields, base.as_deref())?;
            spec = spec.capability(compile_capability(cap));
        }

        // A contract default renders against the fulfilling kind, so it is
        // checked here for every kind that ends up using it.
        let own: BTreeSet<&CapabilityName> =
            entry.capabilities.iter().map(|cap| &cap.name).collect();
        for contract in catalog
            .contracts
            .iter()
            .filter(|contract| entry.fulfils.contains(&contract.name))
        {
            for requirement in &contract.requires {
                let RequirementEntry::WithDefault(default) = requirement else {
                    continue;
                };
                let inherited = base
                    .as_deref()
                    .is_some_and(|base| base.effective_capability(&default.name).is_some());
                if own.contains(&default.name) || inherited {
                    continue;
                }
                check_capability(entry.name.as_str(), default, &known_fields, base.as_deref())
                    .with_context(|| format!("default for {}.{}", contract.name, default.name))?;
            }
        }

        registry.define_kind(spec)?;
    }

    Ok(registry)
}

fn check_capability(
    kind: &str,
    cap: &CapabilityEntry,
    known_fields: &BTreeSet<&str>,
    base: Option<&RoleKind>,
) -> Result<()> {
    for step in &cap.lines {
        match step {
            LineStep::Text(source) => {
                for field in Template::parse(source).placeholders() {
                    if !known_fields.contains(field) {
                        bail!(
                            "capability {}.{} references undeclared field '{}'",
                            kind,
                            cap.name,
                            field
                        );
                    }
                }
            }
            LineStep::CallBase(target) => {
                let Some(base) = base else {
                    bail!(
                        "capability {}.{} calls base capability '{}' but {} has no base",
                        kind,
                        cap.name,
                        target,
                        kind
                    );
                };
                if base.effective_capability(target).is_none() {
                    bail!(
                        "capability {}.{} calls '{}', which base kind {} does not expose",
                        kind,
                        cap.name,
                        target,
                        base.name()
                    );
                }
            }
        }
    }
    Ok(())
}

enum CompiledStep {
    Text(Template),
    CallBase(CapabilityName),
}

fn compile_capability(entry: &CapabilityEntry) -> Capability {
    let steps: Vec<CompiledStep> = entry
        .lines
        .iter()
        .map(|step| match step {
            LineStep::Text(source) => CompiledStep::Text(Template::parse(source)),
            LineStep::CallBase(target) => CompiledStep::CallBase(target.clone()),
        })
        .collect();

    let capability = Capability::new(entry.name.clone(), move |ctx| {
        let mut lines = Vec::new();
        for step in &steps {
            match step {
                CompiledStep::Text(template) => lines.push(template.render(ctx)),
                CompiledStep::CallBase(target) => lines.extend(ctx.call_base(target.clone())),
            }
        }
        lines
    });

    match &entry.replaces {
        Some(target) => capability.replacing(target.clone()),
        None => capability,
    }
}

fn validate_against_schema(catalog_path: &Path) -> Result<()> {
    let catalog_file = File::open(catalog_path)
        .with_context(|| format!("opening catalog {}", catalog_path.display()))?;
    let catalog_value: Value = serde_json::from_reader(BufReader::new(catalog_file))
        .with_context(|| format!("parsing catalog {}", catalog_path.display()))?;

    let declared = catalog_value
        .get("schema_version")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let schema = load_json_schema(CATALOG_SCHEMA, "role_catalog.schema.json")?;
    if declared != schema.schema_version {
        bail!(
            "catalog {} declares schema_version '{}' (expected {})",
            catalog_path.display(),
            declared,
            schema.schema_version
        );
    }

    validate_against(
        &schema,
        &catalog_value,
        &format!("role catalog {}", catalog_path.display()),
    )
}
