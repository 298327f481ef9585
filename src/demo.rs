//! Built-in demonstration: the Animal, Document and Person hierarchies.
//!
//! Scenes are a fixed script of instantiate / set_field / render calls. The
//! same scenes can be declared in a catalog file (`catalog/roles.json`), which
//! must produce identical output.

use crate::catalog::{
    Capability, Contract, FieldSpec, FieldValue, KindName, KindSpec, RoleRegistry,
};
use crate::error::{DefinitionError, InstantiateError};
use crate::record::RenderRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One demonstration instance: optional header line, kind, field assignments.
pub struct Scene {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub kind: KindName,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Scene {
    pub fn new(kind: impl Into<KindName>) -> Self {
        Self {
            header: None,
            kind: kind.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SceneOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub record: RenderRecord,
}

/// Registry holding the demonstration kinds and contracts.
pub fn builtin_registry() -> Result<RoleRegistry, DefinitionError> {
    let mut registry = RoleRegistry::new();

    registry.define_kind(
        KindSpec::new("Animal").capability(Capability::line("eat", "This animal is eating food.")),
    )?;
    registry.define_kind(
        KindSpec::new("Dog")
            .extends("Animal")
            .capability(Capability::line("bark", "The dog says: Woof Woof!")),
    )?;
    registry.define_kind(
        KindSpec::new("Cat")
            .extends("Animal")
            .capability(Capability::line("meow", "The cat says: Meow Meow!")),
    )?;

    registry.define_contract(Contract::new("Printable").requires("print"))?;
    registry.define_contract(Contract::new("Showable").requires("show"))?;
    registry.define_kind(
        KindSpec::new("Document")
            .fulfils("Printable")
            .fulfils("Showable")
            .capability(Capability::line("print", "Printing the document..."))
            .capability(Capability::line("show", "Displaying the document on screen...")),
    )?;

    registry.define_kind(
        KindSpec::new("Person")
            .field(FieldSpec::text("name"))
            .field(FieldSpec::integer("age"))
            .capability(Capability::new("displayPerson", |ctx| {
                vec![
                    format!("Name: {}", ctx.text("name")),
                    format!("Age: {}", ctx.text("age")),
                ]
            })),
    )?;
    registry.define_kind(
        KindSpec::new("Student")
            .extends("Person")
            .field(FieldSpec::integer("studentId"))
            .capability(
                Capability::new("displayStudentInfo", |ctx| {
                    let mut lines = ctx.call_base("displayPerson");
                    lines.push(format!("Student ID: {}", ctx.text("studentId")));
                    lines
                })
                .replacing("displayPerson"),
            ),
    )?;

    Ok(registry)
}

pub fn builtin_scenes() -> Vec<Scene> {
    vec![
        Scene::new("Dog"),
        Scene::new("Cat").header("---"),
        Scene::new("Document").header("---"),
        Scene::new("Student")
            .header("--- Student Details ---")
            .set("name", "Anmol Verma")
            .set("age", 18)
            .set("studentId", 1001),
    ]
}

/// Run each scene: instantiate with no fields, assign the scene's fields one
/// by one, render.
pub fn play(registry: &RoleRegistry, scenes: &[Scene]) -> Result<Vec<SceneOutput>, InstantiateError> {
    scenes
        .iter()
        .map(|scene| {
            let mut instance =
                registry.instantiate(&scene.kind, Vec::<(String, FieldValue)>::new())?;
            for (name, value) in &scene.fields {
                instance.set_field(name.clone(), value.clone());
            }
            Ok(SceneOutput {
                header: scene.header.clone(),
                record: instance.render_record(),
            })
        })
        .collect()
}

/// Console transcript: each header followed by the scene's lines.
pub fn transcript(outputs: &[SceneOutput]) -> Vec<String> {
    let mut lines = Vec::new();
    for output in outputs {
        if let Some(header) = &output.header {
            lines.push(header.clone());
        }
        lines.extend(output.record.lines());
    }
    lines
}
