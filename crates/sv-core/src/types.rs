use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StepVarsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Kind {
    String,
    Int,
    Long,
    Float,
    Double,
    Bool,
    DateTime,
    Object,
    Sequence,
    Mapping,
}

/// Kind names accepted from step text. Lookup is case-insensitive.
pub const KIND_REGISTRY: &[(&str, Kind)] = &[
    ("int", Kind::Int),
    ("string", Kind::String),
    ("double", Kind::Double),
    ("bool", Kind::Bool),
    ("object", Kind::Object),
    ("long", Kind::Long),
    ("float", Kind::Float),
];

impl Kind {
    pub fn from_name(name: &str) -> Result<Self, StepVarsError> {
        let lowered = name.trim().to_lowercase();
        KIND_REGISTRY
            .iter()
            .find(|(registered, _)| *registered == lowered)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| StepVarsError::UnknownKind {
                name: name.to_string(),
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::DateTime => "datetime",
            Self::Object => "object",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }

    pub fn is_collection(self) -> bool {
        matches!(self, Self::Sequence | Self::Mapping)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
