use sv_core::StepVarsError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error(transparent)]
    Vars(#[from] StepVarsError),
    #[error("Assertion failed: {message}")]
    AssertionFailed { message: String },
    #[error("Invalid step table: {message}")]
    InvalidTable { message: String },
    #[error("Invalid date: {message}")]
    InvalidDate { message: String },
    #[error("Value \"{value}\" is not a valid index.")]
    InvalidIndex { value: String },
    #[error("File \"{path}\": {message}")]
    File { path: String, message: String },
    #[error("Invalid XML document: {message}")]
    InvalidXml { message: String },
}

impl StepError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Vars(error) => error.code(),
            Self::AssertionFailed { .. } => "ASSERTION_FAILED",
            Self::InvalidTable { .. } => "INVALID_TABLE",
            Self::InvalidDate { .. } => "INVALID_DATE",
            Self::InvalidIndex { .. } => "INVALID_INDEX",
            Self::File { .. } => "FILE",
            Self::InvalidXml { .. } => "INVALID_XML",
        }
    }

    pub(crate) fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }
}
