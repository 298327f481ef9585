use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Name of a role kind (e.g., `Dog`, `Student`).
///
/// Kinds are registered and looked up by name; the base link of a derived kind
/// is resolved through the registry rather than held as a language-level type.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindName(pub String);

/// Name of a capability; unique within any effective capability list.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityName(pub String);

/// Name of a contract a kind may declare it fulfils.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractName(pub String);

macro_rules! name_impls {
    ($($ty:ident),*) => {$(
        impl $ty {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    )*};
}

name_impls!(KindName, CapabilityName, ContractName);

/// Declared type of an instance field. Only used to pick the default a
/// capability sees when the field was never assigned.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldType {
    Text,
    Integer,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "text" => Some(FieldType::Text),
            "integer" => Some(FieldType::Integer),
            _ => None,
        }
    }

    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldType::Text => FieldValue::Text(String::new()),
            FieldType::Integer => FieldValue::Integer(0),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::from_str(&value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown field type '{value}' (expected text|integer)"
            ))
        })
    }
}

/// Value stored in an instance field.
///
/// No coercion happens against the declared [`FieldType`]; values render
/// verbatim.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_parses_known_and_rejects_unknown() {
        let parsed: FieldType = serde_json::from_str("\"integer\"").unwrap();
        assert_eq!(parsed, FieldType::Integer);
        assert_eq!(serde_json::to_string(&FieldType::Text).unwrap(), "\"text\"");

        let err = serde_json::from_str::<FieldType>("\"float\"").unwrap_err();
        assert!(err.to_string().contains("unknown field type 'float'"));
    }

    #[test]
    fn field_values_keep_json_shape() {
        let number: FieldValue = serde_json::from_str("1001").unwrap();
        assert_eq!(number, FieldValue::Integer(1001));
        let text: FieldValue = serde_json::from_str("\"Anmol Verma\"").unwrap();
        assert_eq!(text, FieldValue::Text("Anmol Verma".into()));
        assert_eq!(number.to_string(), "1001");
        assert_eq!(FieldType::Text.default_value().to_string(), "");
        assert_eq!(FieldType::Integer.default_value().to_string(), "0");
    }

    #[test]
    fn names_are_transparent_strings() {
        let kind = KindName::from("Student");
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"Student\"");
        let parsed: ContractName = serde_json::from_str("\"Printable\"").unwrap();
        assert_eq!(parsed.as_str(), "Printable");
        assert_eq!(CapabilityName::from("bark").to_string(), "bark");
    }
}
