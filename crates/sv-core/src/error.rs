use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepVarsError {
    #[error("Variable \"{name}\" does not exist.")]
    VariableNotFound { name: String },
    #[error("Variable \"{name}\" already exists.")]
    VariableAlreadyExists { name: String },
    #[error("Variable name must not be empty.")]
    EmptyVariableName,
    #[error("Value \"{value}\" cannot be converted to {target_kind}.")]
    InvalidCast { value: String, target_kind: String },
    #[error("There is no type \"{name}\".")]
    UnknownKind { name: String },
    #[error("Circular variable reference: {}.", .chain.join(" -> "))]
    CircularReference { chain: Vec<String> },
    #[error("Collection \"{name}\" is empty.")]
    EmptyCollection { name: String },
    #[error("Index {index} is out of range for \"{name}\" with length {length}.")]
    IndexOutOfRange {
        name: String,
        index: usize,
        length: usize,
    },
    #[error("Mapping \"{name}\" has no entry with key \"{key}\".")]
    KeyNotFound { name: String, key: String },
    #[error("Variable \"{name}\" is not a {expected}.")]
    NotACollection { name: String, expected: String },
    #[error("Element {position} of {container} is {found}, expected {expected}.")]
    KindMismatch {
        container: String,
        position: String,
        expected: String,
        found: String,
    },
    #[error("No variable scope is active for this execution flow.")]
    NoActiveScope,
    #[error("Invalid runtime options: {message}")]
    InvalidOptions { message: String },
}

impl StepVarsError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::VariableNotFound { .. } => "VAR_NOT_FOUND",
            Self::VariableAlreadyExists { .. } => "VAR_EXISTS",
            Self::EmptyVariableName => "VAR_NAME_EMPTY",
            Self::InvalidCast { .. } => "INVALID_CAST",
            Self::UnknownKind { .. } => "UNKNOWN_KIND",
            Self::CircularReference { .. } => "CIRCULAR_REFERENCE",
            Self::EmptyCollection { .. } => "EMPTY_COLLECTION",
            Self::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            Self::KeyNotFound { .. } => "KEY_NOT_FOUND",
            Self::NotACollection { .. } => "NOT_A_COLLECTION",
            Self::KindMismatch { .. } => "KIND_MISMATCH",
            Self::NoActiveScope => "NO_ACTIVE_SCOPE",
            Self::InvalidOptions { .. } => "INVALID_OPTIONS",
        }
    }

    pub fn variable_not_found(name: impl Into<String>) -> Self {
        Self::VariableNotFound { name: name.into() }
    }

    pub fn invalid_cast(value: impl Into<String>, target_kind: impl Into<String>) -> Self {
        Self::InvalidCast {
            value: value.into(),
            target_kind: target_kind.into(),
        }
    }
}
