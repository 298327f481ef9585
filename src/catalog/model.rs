//! In-memory role model: capabilities, contracts, kind specs and resolved kinds.
//!
//! A [`KindSpec`] is what callers write; the registry turns it into a
//! [`RoleKind`] whose effective capability list is resolved once and shared
//! read-only by every instance of the kind.

use crate::catalog::identity::{CapabilityName, ContractName, FieldType, FieldValue, KindName};
use crate::render::RenderContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Renderer attached to a capability. Returns the lines it produces.
pub type RenderFn = Arc<dyn Fn(&RenderContext<'_>) -> Vec<String> + Send + Sync>;

#[derive(Clone)]
/// Named, renderable behavior attached to a kind or a contract default.
pub struct Capability {
    name: CapabilityName,
    replaces: Option<CapabilityName>,
    render: RenderFn,
}

impl Capability {
    pub fn new<F>(name: impl Into<CapabilityName>, render: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            replaces: None,
            render: Arc::new(render),
        }
    }

    /// Capability that always renders the same single line.
    pub fn line(name: impl Into<CapabilityName>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(name, move |_| vec![text.clone()])
    }

    /// Mark this capability as an explicit override of an inherited one.
    ///
    /// The override takes the inherited entry's position in the effective
    /// list. It does not call the replaced renderer unless it asks for it via
    /// [`RenderContext::call_base`].
    pub fn replacing(mut self, target: impl Into<CapabilityName>) -> Self {
        self.replaces = Some(target.into());
        self
    }

    /// Override the inherited capability of the same name.
    pub fn overriding(self) -> Self {
        let target = self.name.clone();
        self.replacing(target)
    }

    pub fn name(&self) -> &CapabilityName {
        &self.name
    }

    pub fn replaces(&self) -> Option<&CapabilityName> {
        self.replaces.as_ref()
    }

    pub(crate) fn render(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        (self.render)(ctx)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("replaces", &self.replaces)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
/// One required signature of a contract, optionally with a default renderer.
pub struct Requirement {
    pub name: CapabilityName,
    pub default: Option<Capability>,
}

#[derive(Clone, Debug)]
/// Named set of capability signatures a kind may declare it fulfils.
pub struct Contract {
    name: ContractName,
    requires: Vec<Requirement>,
}

impl Contract {
    pub fn new(name: impl Into<ContractName>) -> Self {
        Self {
            name: name.into(),
            requires: Vec::new(),
        }
    }

    pub fn requires(mut self, capability: impl Into<CapabilityName>) -> Self {
        self.requires.push(Requirement {
            name: capability.into(),
            default: None,
        });
        self
    }

    /// Require a capability but fall back to `default` when the kind does not
    /// provide one.
    pub fn requires_with_default(mut self, default: Capability) -> Self {
        self.requires.push(Requirement {
            name: default.name().clone(),
            default: Some(default),
        });
        self
    }

    pub fn name(&self) -> &ContractName {
        &self.name
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requires
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Field declared on a kind.
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: FieldType::Text,
            required: false,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: FieldType::Integer,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(&self) -> FieldValue {
        self.ty.default_value()
    }
}

#[derive(Clone, Debug)]
/// Unresolved kind definition handed to [`crate::RoleRegistry::define_kind`].
pub struct KindSpec {
    pub(crate) name: KindName,
    pub(crate) base: Option<KindName>,
    pub(crate) capabilities: Vec<Capability>,
    pub(crate) contracts: Vec<ContractName>,
    pub(crate) fields: Vec<FieldSpec>,
}

impl KindSpec {
    pub fn new(name: impl Into<KindName>) -> Self {
        Self {
            name: name.into(),
            base: None,
            capabilities: Vec::new(),
            contracts: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn extends(mut self, base: impl Into<KindName>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn fulfils(mut self, contract: impl Into<ContractName>) -> Self {
        self.contracts.push(contract.into());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &KindName {
        &self.name
    }
}

#[derive(Clone, Debug)]
/// Entry of a resolved effective capability list.
pub struct EffectiveCapability {
    pub capability: Capability,
    /// Kind whose definition supplied this entry. Base call-through from the
    /// capability resolves against this kind's base.
    pub scope: KindName,
    /// Contract the entry fulfils, if any.
    pub contract: Option<ContractName>,
}

impl EffectiveCapability {
    pub fn name(&self) -> &CapabilityName {
        self.capability.name()
    }
}

#[derive(Debug)]
/// Kind resolved against the registry. Immutable once built.
pub struct RoleKind {
    pub(crate) name: KindName,
    pub(crate) base: Option<Arc<RoleKind>>,
    pub(crate) own: Vec<Capability>,
    pub(crate) contracts: Vec<Arc<Contract>>,
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) effective: Vec<EffectiveCapability>,
}

impl RoleKind {
    pub fn name(&self) -> &KindName {
        &self.name
    }

    pub fn base(&self) -> Option<&RoleKind> {
        self.base.as_deref()
    }

    pub fn own_capabilities(&self) -> &[Capability] {
        &self.own
    }

    pub fn contracts(&self) -> &[Arc<Contract>] {
        &self.contracts
    }

    /// Fields declared directly on this kind (not inherited ones).
    pub fn own_fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn effective_capabilities(&self) -> &[EffectiveCapability] {
        &self.effective
    }

    pub fn effective_capability(&self, name: &CapabilityName) -> Option<&EffectiveCapability> {
        self.effective.iter().find(|entry| entry.name() == name)
    }

    pub fn capability_names(&self) -> Vec<&CapabilityName> {
        self.effective.iter().map(EffectiveCapability::name).collect()
    }

    /// This kind followed by its bases, root last.
    pub fn lineage(&self) -> impl Iterator<Item = &RoleKind> {
        std::iter::successors(Some(self), |kind| kind.base())
    }

    /// Find this kind or one of its bases by name.
    pub fn ancestor(&self, name: &KindName) -> Option<&RoleKind> {
        self.lineage().find(|kind| &kind.name == name)
    }

    /// Resolve a field declaration; derived declarations shadow base ones.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.lineage()
            .find_map(|kind| kind.fields.iter().find(|field| field.name == name))
    }

    /// Whether this kind or any base declares the contract.
    pub fn fulfils(&self, contract: &ContractName) -> bool {
        self.lineage()
            .any(|kind| kind.contracts.iter().any(|c| c.name() == contract))
    }
}
