//! Typed errors raised while defining kinds and creating instances.
//!
//! Definition errors are schema-time: they mean the kind or contract as written
//! cannot be resolved, and the caller has to change the definition. Rendering
//! and field assignment have no error path.

use crate::catalog::{CapabilityName, ContractName, KindName};
use thiserror::Error;

/// Problems found while registering a contract or resolving a kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// Two capabilities in one effective list share a name and neither is an
    /// explicit override.
    #[error("kind {kind} has more than one capability named '{capability}'")]
    DuplicateCapability {
        kind: KindName,
        capability: CapabilityName,
    },

    /// A declared contract requires a capability nothing provides.
    #[error("kind {kind} does not fulfil contract {contract}: missing capability '{missing}'")]
    UnfulfilledContract {
        kind: KindName,
        contract: ContractName,
        missing: CapabilityName,
    },

    /// An override points at a capability the base kind does not expose.
    #[error("kind {kind}: capability '{capability}' replaces unknown inherited capability '{target}'")]
    UnknownOverrideTarget {
        kind: KindName,
        capability: CapabilityName,
        target: CapabilityName,
    },

    #[error("kind {kind} extends unknown kind {base}")]
    UnknownBase { kind: KindName, base: KindName },

    #[error("kind {kind} declares unknown contract {contract}")]
    UnknownContract {
        kind: KindName,
        contract: ContractName,
    },

    #[error("kind {kind} declares contract {contract} more than once")]
    RepeatedContract {
        kind: KindName,
        contract: ContractName,
    },

    #[error("kind {kind} declares field '{field}' more than once")]
    DuplicateField { kind: KindName, field: String },

    #[error("kind {0} is already defined")]
    DuplicateKind(KindName),

    #[error("contract {0} is already defined")]
    DuplicateContract(ContractName),

    #[error("contract {contract} requires '{capability}' more than once")]
    RepeatedRequirement {
        contract: ContractName,
        capability: CapabilityName,
    },
}

/// Problems found while constructing an instance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstantiateError {
    #[error("unknown kind {0}")]
    UnknownKind(KindName),

    #[error("kind {kind} requires field '{field}'")]
    MissingField { kind: KindName, field: String },
}
