use std::fmt;

use serde::{Deserialize, Serialize};
use sv_runtime::ScopeHandle;

use crate::error::StepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextCheck {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
}

impl TextCheck {
    pub fn holds(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::NotEquals => actual != expected,
            Self::Contains => actual.contains(expected),
            Self::NotContains => !actual.contains(expected),
            Self::StartsWith => actual.starts_with(expected),
            Self::EndsWith => actual.ends_with(expected),
        }
    }
}

impl fmt::Display for TextCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Equals => "equal",
            Self::NotEquals => "not equal",
            Self::Contains => "contain",
            Self::NotContains => "not contain",
            Self::StartsWith => "start with",
            Self::EndsWith => "end with",
        };
        f.write_str(label)
    }
}

/// Compares the rendered value of `name` with the interpolated `expected`.
pub fn assert_text(
    scope: &ScopeHandle,
    name: &str,
    check: TextCheck,
    expected: &str,
) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_exists(name)?;
    let expected = scope.resolve_or_literal(expected)?;
    let Some(actual) = store.get_value_text(name) else {
        return Err(StepError::assertion(format!(
            "variable \"{}\" is null, expected it to {} \"{}\"",
            name, check, expected
        )));
    };
    if check.holds(&actual, &expected) {
        return Ok(());
    }
    Err(StepError::assertion(format!(
        "variable \"{}\" is \"{}\", expected it to {} \"{}\"",
        name, actual, check, expected
    )))
}

pub fn assert_null(scope: &ScopeHandle, name: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    let value = store.get(name)?.value;
    if value.is_null() {
        return Ok(());
    }
    Err(StepError::assertion(format!(
        "variable \"{}\" is not null",
        name
    )))
}

pub fn assert_not_null(scope: &ScopeHandle, name: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    if store.get(name)?.value.is_null() {
        return Err(StepError::assertion(format!("variable \"{}\" is null", name)));
    }
    Ok(())
}

/// Null or whitespace-only text counts as empty.
pub fn assert_empty(scope: &ScopeHandle, name: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_exists(name)?;
    match store.get_value_text(name) {
        Some(text) if !text.trim().is_empty() => Err(StepError::assertion(format!(
            "variable \"{}\" is \"{}\", expected it to be empty",
            name, text
        ))),
        _ => Ok(()),
    }
}

pub fn assert_not_empty(scope: &ScopeHandle, name: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_exists(name)?;
    match store.get_value_text(name) {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(StepError::assertion(format!(
            "variable \"{}\" is empty",
            name
        ))),
    }
}
