//! Rendering of effective capability lists.
//!
//! Rendering is pure: it reads the instance and returns lines. Emitting them
//! (stdout, JSON) is left to the caller.

use crate::catalog::{CapabilityName, EffectiveCapability, FieldValue, RoleKind};
use crate::instance::RoleInstance;
use crate::record::{RenderRecord, RenderedCapability};
use tracing::trace;

/// What a capability renderer can see while producing its lines.
pub struct RenderContext<'a> {
    instance: &'a RoleInstance,
    scope: &'a RoleKind,
}

impl<'a> RenderContext<'a> {
    /// Field value with type default applied. Never fails.
    pub fn field(&self, name: &str) -> FieldValue {
        self.instance.field_or_default(name)
    }

    /// Field value formatted for display.
    pub fn text(&self, name: &str) -> String {
        self.field(name).to_string()
    }

    pub fn instance(&self) -> &RoleInstance {
        self.instance
    }

    /// Kind that declared the capability being rendered.
    pub fn scope(&self) -> &RoleKind {
        self.scope
    }

    /// Render `name` as the declaring kind's base resolves it.
    ///
    /// This is the explicit call-through an override uses to reuse the
    /// capability it replaced. Yields no lines when the declaring kind has no
    /// base or the base has no such capability.
    pub fn call_base(&self, name: impl Into<CapabilityName>) -> Vec<String> {
        let name = name.into();
        let Some(base) = self.scope.base() else {
            return Vec::new();
        };
        match base.effective_capability(&name) {
            Some(entry) => render_entry(self.instance, entry),
            None => Vec::new(),
        }
    }
}

fn render_entry(instance: &RoleInstance, entry: &EffectiveCapability) -> Vec<String> {
    let scope = instance
        .kind()
        .ancestor(&entry.scope)
        .unwrap_or_else(|| instance.kind());
    let ctx = RenderContext { instance, scope };
    let lines = entry.capability.render(&ctx);
    trace!(
        kind = %instance.kind().name(),
        capability = %entry.name(),
        scope = %entry.scope,
        lines = lines.len(),
        "rendered capability"
    );
    lines
}

/// Render every capability of the instance's effective list, in order.
pub fn render_all(instance: &RoleInstance) -> Vec<String> {
    instance
        .kind()
        .effective_capabilities()
        .iter()
        .flat_map(|entry| render_entry(instance, entry))
        .collect()
}

/// Structured form of [`render_all`], keeping per-capability attribution.
pub fn render_record(instance: &RoleInstance) -> RenderRecord {
    let kind = instance.kind();
    RenderRecord::new(
        kind.name().clone(),
        kind.lineage().map(|k| k.name().clone()).collect(),
        kind.effective_capabilities()
            .iter()
            .map(|entry| RenderedCapability {
                name: entry.name().clone(),
                scope: entry.scope.clone(),
                contract: entry.contract.clone(),
                lines: render_entry(instance, entry),
            })
            .collect(),
    )
}
