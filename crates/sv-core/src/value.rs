use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::StepVarsError;
use crate::types::Kind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum TypedValue {
    Null,
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Object(serde_json::Value),
    #[serde(rename_all = "camelCase")]
    Sequence {
        element_kind: Kind,
        items: Vec<TypedValue>,
    },
    #[serde(rename_all = "camelCase")]
    Mapping {
        value_kind: Kind,
        entries: IndexMap<String, TypedValue>,
    },
}

impl TypedValue {
    pub fn sequence(element_kind: Kind, items: Vec<TypedValue>) -> Result<Self, StepVarsError> {
        for (index, item) in items.iter().enumerate() {
            if !is_kind_compatible(item, element_kind) {
                return Err(StepVarsError::KindMismatch {
                    container: format!("sequence of {}", element_kind),
                    position: index.to_string(),
                    expected: element_kind.to_string(),
                    found: item.kind().to_string(),
                });
            }
        }
        Ok(Self::Sequence {
            element_kind,
            items,
        })
    }

    pub fn mapping(
        value_kind: Kind,
        entries: IndexMap<String, TypedValue>,
    ) -> Result<Self, StepVarsError> {
        for (key, value) in &entries {
            if !is_kind_compatible(value, value_kind) {
                return Err(StepVarsError::KindMismatch {
                    container: format!("mapping of {}", value_kind),
                    position: format!("\"{}\"", key),
                    expected: value_kind.to_string(),
                    found: value.kind().to_string(),
                });
            }
        }
        Ok(Self::Mapping {
            value_kind,
            entries,
        })
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Null | Self::Object(_) => Kind::Object,
            Self::String(_) => Kind::String,
            Self::Int(_) => Kind::Int,
            Self::Long(_) => Kind::Long,
            Self::Float(_) => Kind::Float,
            Self::Double(_) => Kind::Double,
            Self::Bool(_) => Kind::Bool,
            Self::DateTime(_) => Kind::DateTime,
            Self::Sequence { .. } => Kind::Sequence,
            Self::Mapping { .. } => Kind::Mapping,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[TypedValue]> {
        match self {
            Self::Sequence { items, .. } => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, TypedValue>> {
        match self {
            Self::Mapping { entries, .. } => Some(entries),
            _ => None,
        }
    }
}

/// `Kind::Object` admits any element, including `Null`.
pub fn is_kind_compatible(value: &TypedValue, kind: Kind) -> bool {
    kind == Kind::Object || value.kind() == kind
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: TypedValue,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: TypedValue) -> Result<Self, StepVarsError> {
        let name = name.into();
        if name.is_empty() {
            return Err(StepVarsError::EmptyVariableName);
        }
        Ok(Self { name, value })
    }
}
