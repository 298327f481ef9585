//! Holds contracts and resolved kinds for lookup by name.
//!
//! Kinds are registered in dependency order: a base must be defined before any
//! kind that extends it, which also rules out cycles. Resolution happens once
//! in [`RoleRegistry::define_kind`]; instances only read the result.

use crate::catalog::identity::{CapabilityName, ContractName, FieldValue, KindName};
use crate::catalog::model::{
    Capability, Contract, EffectiveCapability, KindSpec, Requirement, RoleKind,
};
use crate::error::{DefinitionError, InstantiateError};
use crate::instance::RoleInstance;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
/// In-memory store for contracts and kinds keyed by name.
pub struct RoleRegistry {
    contracts: BTreeMap<ContractName, Arc<Contract>>,
    kinds: BTreeMap<KindName, Arc<RoleKind>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contract for later use by kinds.
    pub fn define_contract(&mut self, contract: Contract) -> Result<Arc<Contract>, DefinitionError> {
        if self.contracts.contains_key(contract.name()) {
            return Err(DefinitionError::DuplicateContract(contract.name().clone()));
        }
        let mut seen = BTreeSet::new();
        for requirement in contract.requirements() {
            if !seen.insert(&requirement.name) {
                return Err(DefinitionError::RepeatedRequirement {
                    contract: contract.name().clone(),
                    capability: requirement.name.clone(),
                });
            }
        }

        debug!(
            contract = %contract.name(),
            requires = contract.requirements().len(),
            "defined contract"
        );
        let contract = Arc::new(contract);
        self.contracts
            .insert(contract.name().clone(), Arc::clone(&contract));
        Ok(contract)
    }

    /// Resolve and register a kind.
    ///
    /// The effective list is the base's list (overrides replace entries in
    /// place), then own capabilities that fulfil no declared contract, then
    /// one entry per contract signature in declaration order unless an
    /// inherited entry already covers it.
    pub fn define_kind(&mut self, spec: KindSpec) -> Result<Arc<RoleKind>, DefinitionError> {
        let KindSpec {
            name,
            base,
            capabilities,
            contracts,
            fields,
        } = spec;

        if self.kinds.contains_key(&name) {
            return Err(DefinitionError::DuplicateKind(name));
        }

        let base = match base {
            Some(base_name) => Some(self.kinds.get(&base_name).cloned().ok_or_else(|| {
                DefinitionError::UnknownBase {
                    kind: name.clone(),
                    base: base_name,
                }
            })?),
            None => None,
        };

        let contracts = self.resolve_contracts(&name, contracts)?;

        let mut field_names = BTreeSet::new();
        for field in &fields {
            if !field_names.insert(field.name.as_str()) {
                return Err(DefinitionError::DuplicateField {
                    kind: name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let inherited = base
            .as_ref()
            .map(|kind| kind.effective.clone())
            .unwrap_or_default();
        let effective = merge_capabilities(&name, inherited, &capabilities, &contracts)?;

        debug!(
            kind = %name,
            base = ?base.as_ref().map(|kind| kind.name.as_str()),
            capabilities = effective.len(),
            "defined kind"
        );

        let kind = Arc::new(RoleKind {
            name: name.clone(),
            base,
            own: capabilities,
            contracts,
            fields,
            effective,
        });
        self.kinds.insert(name, Arc::clone(&kind));
        Ok(kind)
    }

    /// Fetch a kind by name, if present.
    pub fn kind(&self, name: &KindName) -> Option<&Arc<RoleKind>> {
        self.kinds.get(name)
    }

    pub fn contract(&self, name: &ContractName) -> Option<&Arc<Contract>> {
        self.contracts.get(name)
    }

    /// Kind names in stable order.
    pub fn kind_names(&self) -> impl Iterator<Item = &KindName> {
        self.kinds.keys()
    }

    /// Instantiate a registered kind by name.
    pub fn instantiate<I, K, V>(&self, kind: &KindName, fields: I) -> Result<RoleInstance, InstantiateError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let kind = self
            .kinds
            .get(kind)
            .cloned()
            .ok_or_else(|| InstantiateError::UnknownKind(kind.clone()))?;
        RoleInstance::instantiate(kind, fields)
    }

    fn resolve_contracts(
        &self,
        kind: &KindName,
        names: Vec<ContractName>,
    ) -> Result<Vec<Arc<Contract>>, DefinitionError> {
        let mut seen = BTreeSet::new();
        let mut resolved = Vec::with_capacity(names.len());
        for contract in names {
            if !seen.insert(contract.clone()) {
                return Err(DefinitionError::RepeatedContract {
                    kind: kind.clone(),
                    contract,
                });
            }
            let found = self.contracts.get(&contract).cloned().ok_or_else(|| {
                DefinitionError::UnknownContract {
                    kind: kind.clone(),
                    contract: contract.clone(),
                }
            })?;
            resolved.push(found);
        }
        Ok(resolved)
    }
}

fn merge_capabilities(
    kind: &KindName,
    mut effective: Vec<EffectiveCapability>,
    own: &[Capability],
    contracts: &[Arc<Contract>],
) -> Result<Vec<EffectiveCapability>, DefinitionError> {
    let duplicate = |capability: &CapabilityName| DefinitionError::DuplicateCapability {
        kind: kind.clone(),
        capability: capability.clone(),
    };

    let mut own_names = BTreeSet::new();
    for capability in own {
        if !own_names.insert(capability.name()) {
            return Err(duplicate(capability.name()));
        }
    }

    let required: Vec<(&ContractName, &Requirement)> = contracts
        .iter()
        .flat_map(|contract| {
            contract
                .requirements()
                .iter()
                .map(move |requirement| (contract.name(), requirement))
        })
        .collect();
    let mut required_by: BTreeMap<&CapabilityName, &ContractName> = BTreeMap::new();
    for (contract, requirement) in required.iter().copied() {
        required_by.entry(&requirement.name).or_insert(contract);
    }

    // Targets resolve against the base list as inherited, not as rewritten
    // by earlier overrides.
    let inherited: Vec<CapabilityName> = effective.iter().map(|e| e.name().clone()).collect();
    let mut claimed = BTreeSet::new();

    // Overrides first so a replaced name is free for a plain capability.
    for capability in own.iter().filter(|cap| cap.replaces().is_some()) {
        let Some(target) = capability.replaces() else {
            continue;
        };
        let position = inherited
            .iter()
            .position(|name| name == target)
            .ok_or_else(|| DefinitionError::UnknownOverrideTarget {
                kind: kind.clone(),
                capability: capability.name().clone(),
                target: target.clone(),
            })?;
        if !claimed.insert(position) {
            return Err(duplicate(target));
        }
        let collides = effective
            .iter()
            .enumerate()
            .any(|(idx, entry)| idx != position && entry.name() == capability.name());
        if collides {
            return Err(duplicate(capability.name()));
        }
        let contract = match required_by.get(capability.name()) {
            Some(contract) => Some((*contract).clone()),
            None => effective[position].contract.clone(),
        };
        effective[position] = EffectiveCapability {
            capability: capability.clone(),
            scope: kind.clone(),
            contract,
        };
    }

    let required_names: BTreeSet<&CapabilityName> = required_by.keys().copied().collect();

    let mut fulfilling: BTreeMap<&CapabilityName, &Capability> = BTreeMap::new();
    for capability in own.iter().filter(|cap| cap.replaces().is_none()) {
        if effective.iter().any(|entry| entry.name() == capability.name()) {
            return Err(duplicate(capability.name()));
        }
        if required_names.contains(capability.name()) {
            fulfilling.insert(capability.name(), capability);
            continue;
        }
        effective.push(EffectiveCapability {
            capability: capability.clone(),
            scope: kind.clone(),
            contract: None,
        });
    }

    for (contract, requirement) in required {
        if effective.iter().any(|entry| entry.name() == &requirement.name) {
            continue;
        }
        let capability = match fulfilling.remove(&requirement.name) {
            Some(capability) => capability.clone(),
            None => match &requirement.default {
                Some(default) => default.clone(),
                None => {
                    return Err(DefinitionError::UnfulfilledContract {
                        kind: kind.clone(),
                        contract: contract.clone(),
                        missing: requirement.name.clone(),
                    });
                }
            },
        };
        effective.push(EffectiveCapability {
            capability,
            scope: kind.clone(),
            contract: Some(contract.clone()),
        });
    }

    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldSpec;

    fn names(kind: &RoleKind) -> Vec<&str> {
        kind.capability_names()
            .into_iter()
            .map(CapabilityName::as_str)
            .collect()
    }

    fn animal_registry() -> RoleRegistry {
        let mut registry = RoleRegistry::new();
        registry
            .define_kind(
                KindSpec::new("Animal")
                    .capability(Capability::line("eat", "This animal is eating food.")),
            )
            .unwrap();
        registry
    }

    #[test]
    fn derived_kind_extends_base_list() {
        let mut registry = animal_registry();
        let dog = registry
            .define_kind(
                KindSpec::new("Dog")
                    .extends("Animal")
                    .capability(Capability::line("bark", "The dog says: Woof Woof!")),
            )
            .unwrap();
        assert_eq!(names(&dog), ["eat", "bark"]);
        assert_eq!(dog.effective_capabilities()[0].scope, KindName::from("Animal"));
        assert_eq!(dog.effective_capabilities()[1].scope, KindName::from("Dog"));
    }

    #[test]
    fn override_replaces_in_place() {
        let mut registry = animal_registry();
        registry
            .define_kind(
                KindSpec::new("Dog")
                    .extends("Animal")
                    .capability(Capability::line("bark", "Woof")),
            )
            .unwrap();
        let puppy = registry
            .define_kind(
                KindSpec::new("Puppy")
                    .extends("Dog")
                    .capability(Capability::line("eat", "The puppy nibbles.").overriding())
                    .capability(Capability::line("wag", "wag")),
            )
            .unwrap();
        assert_eq!(names(&puppy), ["eat", "bark", "wag"]);
        assert_eq!(puppy.effective_capabilities()[0].scope, KindName::from("Puppy"));
    }

    #[test]
    fn renamed_override_takes_the_base_slot() {
        let mut registry = RoleRegistry::new();
        registry
            .define_kind(
                KindSpec::new("Person")
                    .field(FieldSpec::text("name"))
                    .capability(Capability::line("displayPerson", "person")),
            )
            .unwrap();
        let student = registry
            .define_kind(
                KindSpec::new("Student").extends("Person").capability(
                    Capability::line("displayStudentInfo", "student").replacing("displayPerson"),
                ),
            )
            .unwrap();
        assert_eq!(names(&student), ["displayStudentInfo"]);
    }

    #[test]
    fn two_overrides_cannot_claim_one_slot() {
        let mut registry = animal_registry();
        let err = registry
            .define_kind(
                KindSpec::new("Dog")
                    .extends("Animal")
                    .capability(Capability::line("eat", "The dog eats.").overriding())
                    .capability(Capability::line("feast", "The dog feasts.").replacing("eat")),
            )
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateCapability {
                kind: "Dog".into(),
                capability: "eat".into(),
            }
        );
        assert!(registry.kind(&"Dog".into()).is_none());
    }

    #[test]
    fn renamed_override_takes_the_contract_it_satisfies() {
        let mut registry = animal_registry();
        registry
            .define_contract(Contract::new("Showable").requires("show"))
            .unwrap();
        let seal = registry
            .define_kind(
                KindSpec::new("Seal")
                    .extends("Animal")
                    .fulfils("Showable")
                    .capability(Capability::line("show", "The seal performs.").replacing("eat")),
            )
            .unwrap();
        assert_eq!(names(&seal), ["show"]);
        assert_eq!(
            seal.effective_capabilities()[0].contract,
            Some(ContractName::from("Showable"))
        );
    }

    #[test]
    fn redefining_without_override_is_a_duplicate() {
        let mut registry = animal_registry();
        let err = registry
            .define_kind(
                KindSpec::new("Dog")
                    .extends("Animal")
                    .capability(Capability::line("eat", "again")),
            )
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateCapability {
                kind: "Dog".into(),
                capability: "eat".into(),
            }
        );
        assert!(registry.kind(&"Dog".into()).is_none());
    }

    #[test]
    fn own_duplicates_are_rejected() {
        let mut registry = RoleRegistry::new();
        let err = registry
            .define_kind(
                KindSpec::new("Cat")
                    .capability(Capability::line("meow", "a"))
                    .capability(Capability::line("meow", "b")),
            )
            .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateCapability { .. }));
    }

    #[test]
    fn override_needs_an_inherited_target() {
        let mut registry = animal_registry();
        let err = registry
            .define_kind(
                KindSpec::new("Cat")
                    .extends("Animal")
                    .capability(Capability::line("purr", "purr").replacing("sleep")),
            )
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::UnknownOverrideTarget {
                kind: "Cat".into(),
                capability: "purr".into(),
                target: "sleep".into(),
            }
        );
    }

    #[test]
    fn contracts_must_be_fulfilled() {
        let mut registry = RoleRegistry::new();
        registry
            .define_contract(Contract::new("Printable").requires("print"))
            .unwrap();
        registry
            .define_contract(Contract::new("Showable").requires("show"))
            .unwrap();

        let err = registry
            .define_kind(
                KindSpec::new("Draft")
                    .fulfils("Printable")
                    .fulfils("Showable")
                    .capability(Capability::line("print", "p")),
            )
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::UnfulfilledContract {
                kind: "Draft".into(),
                contract: "Showable".into(),
                missing: "show".into(),
            }
        );
    }

    #[test]
    fn contract_capabilities_follow_contract_order() {
        let mut registry = RoleRegistry::new();
        registry
            .define_contract(Contract::new("Printable").requires("print"))
            .unwrap();
        registry
            .define_contract(Contract::new("Showable").requires("show"))
            .unwrap();
        let memo = registry
            .define_kind(
                KindSpec::new("Memo")
                    .fulfils("Printable")
                    .fulfils("Showable")
                    .capability(Capability::line("show", "s"))
                    .capability(Capability::line("archive", "a"))
                    .capability(Capability::line("print", "p")),
            )
            .unwrap();
        assert_eq!(names(&memo), ["archive", "print", "show"]);
        let contract_of: Vec<_> = memo
            .effective_capabilities()
            .iter()
            .map(|entry| entry.contract.as_ref().map(ContractName::as_str))
            .collect();
        assert_eq!(contract_of, [None, Some("Printable"), Some("Showable")]);
    }

    #[test]
    fn contract_default_fills_the_gap() {
        let mut registry = RoleRegistry::new();
        registry
            .define_contract(
                Contract::new("Showable")
                    .requires_with_default(Capability::line("show", "Showing by default")),
            )
            .unwrap();
        let poster = registry
            .define_kind(KindSpec::new("Poster").fulfils("Showable"))
            .unwrap();
        assert_eq!(names(&poster), ["show"]);
        assert_eq!(poster.effective_capabilities()[0].scope, KindName::from("Poster"));
    }

    #[test]
    fn inherited_capability_satisfies_contract_in_place() {
        let mut registry = animal_registry();
        registry
            .define_contract(Contract::new("Feeds").requires("eat"))
            .unwrap();
        let cow = registry
            .define_kind(
                KindSpec::new("Cow")
                    .extends("Animal")
                    .fulfils("Feeds")
                    .capability(Capability::line("moo", "Moo")),
            )
            .unwrap();
        assert_eq!(names(&cow), ["eat", "moo"]);
        assert!(cow.fulfils(&"Feeds".into()));
    }

    #[test]
    fn unknown_references_and_repeats_are_rejected() {
        let mut registry = animal_registry();
        assert!(matches!(
            registry.define_kind(KindSpec::new("Bird").extends("Dinosaur")),
            Err(DefinitionError::UnknownBase { .. })
        ));
        assert!(matches!(
            registry.define_kind(KindSpec::new("Bird").fulfils("Flies")),
            Err(DefinitionError::UnknownContract { .. })
        ));
        assert_eq!(
            registry.define_kind(KindSpec::new("Animal")).unwrap_err(),
            DefinitionError::DuplicateKind("Animal".into())
        );
        assert!(matches!(
            registry.define_kind(
                KindSpec::new("Bird")
                    .field(FieldSpec::text("name"))
                    .field(FieldSpec::integer("name"))
            ),
            Err(DefinitionError::DuplicateField { .. })
        ));

        registry
            .define_contract(Contract::new("Flies").requires("fly"))
            .unwrap();
        assert!(matches!(
            registry.define_contract(Contract::new("Flies")),
            Err(DefinitionError::DuplicateContract(_))
        ));
        assert!(matches!(
            registry.define_contract(Contract::new("Swims").requires("swim").requires("swim")),
            Err(DefinitionError::RepeatedRequirement { .. })
        ));
        assert!(matches!(
            registry.define_kind(
                KindSpec::new("Bird")
                    .fulfils("Flies")
                    .fulfils("Flies")
                    .capability(Capability::line("fly", "f"))
            ),
            Err(DefinitionError::RepeatedContract { .. })
        ));
    }

    #[test]
    fn instantiate_by_name() {
        let registry = animal_registry();
        let animal = registry
            .instantiate(&"Animal".into(), Vec::<(String, FieldValue)>::new())
            .unwrap();
        assert_eq!(animal.kind().name().as_str(), "Animal");
        assert_eq!(
            registry
                .instantiate(&"Unicorn".into(), Vec::<(String, FieldValue)>::new())
                .unwrap_err(),
            InstantiateError::UnknownKind("Unicorn".into())
        );
    }
}
