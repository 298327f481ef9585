//! Runtime role values: one resolved kind plus owned field data.

use crate::catalog::{FieldValue, RoleKind};
use crate::error::InstantiateError;
use crate::record::RenderRecord;
use crate::render;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
/// Concrete instance of a [`RoleKind`].
///
/// The kind is shared read-only; field data belongs to this value alone.
pub struct RoleInstance {
    kind: Arc<RoleKind>,
    fields: BTreeMap<String, FieldValue>,
}

impl RoleInstance {
    /// Build an instance from initial field values.
    ///
    /// Only fields declared `required` on the kind (or a base) are checked for
    /// presence. Values are stored as given.
    pub fn instantiate<I, K, V>(kind: Arc<RoleKind>, fields: I) -> Result<Self, InstantiateError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let fields: BTreeMap<String, FieldValue> = fields
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();

        for declared in kind.lineage().flat_map(|k| k.own_fields()) {
            if declared.required && !fields.contains_key(&declared.name) {
                return Err(InstantiateError::MissingField {
                    kind: kind.name().clone(),
                    field: declared.name.clone(),
                });
            }
        }

        Ok(Self { kind, fields })
    }

    pub fn kind(&self) -> &RoleKind {
        &self.kind
    }

    pub fn shared_kind(&self) -> &Arc<RoleKind> {
        &self.kind
    }

    /// Assign a field in place.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Value explicitly assigned to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Field value as a capability sees it: the assigned value, else the
    /// declared type's default, else empty text.
    pub fn field_or_default(&self, name: &str) -> FieldValue {
        if let Some(value) = self.fields.get(name) {
            return value.clone();
        }
        self.kind
            .field(name)
            .map(|spec| spec.default_value())
            .unwrap_or_else(|| FieldValue::Text(String::new()))
    }

    pub fn render_all(&self) -> Vec<String> {
        render::render_all(self)
    }

    pub fn render_record(&self) -> RenderRecord {
        render::render_record(self)
    }
}
