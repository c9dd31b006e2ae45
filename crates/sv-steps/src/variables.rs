use roxmltree::Document;
use sv_core::{Kind, StepVarsError, TypedValue};
use sv_runtime::{parse, ScopeHandle};
use tracing::debug;

use crate::error::StepError;

pub fn store_text(scope: &ScopeHandle, text: &str, name: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let resolved = scope.resolve(text)?;
    store.set(name, TypedValue::String(resolved))?;
    Ok(())
}

/// Joins `lines` with `\n` and stores the interpolated block.
pub fn store_multiline_text(
    scope: &ScopeHandle,
    name: &str,
    lines: &[String],
) -> Result<(), StepError> {
    store_text(scope, &lines.join("\n"), name)
}

/// Stores the interpolated `xml` after checking it is a well-formed document
/// with a root element.
pub fn store_xml_text(scope: &ScopeHandle, name: &str, xml: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let body = scope.resolve(xml)?;
    let document = Document::parse(&body).map_err(|error| StepError::InvalidXml {
        message: error.to_string(),
    })?;
    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(StepError::InvalidXml {
            message: "document has no root element".to_string(),
        });
    };
    debug!(variable = name, root = root.tag_name().name(), "stored XML document");
    store.set(name, TypedValue::String(body.clone()))?;
    Ok(())
}

/// Integral text becomes `Int` (or `Long` when it does not fit), anything
/// else is read as a `Double`.
pub fn store_number(scope: &ScopeHandle, number: &str, name: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let resolved = scope.resolve(number)?;
    store.set(name, parse_number(&resolved)?)?;
    Ok(())
}

pub(crate) fn parse_number(text: &str) -> Result<TypedValue, StepVarsError> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i32>() {
        return Ok(TypedValue::Int(value));
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(TypedValue::Long(value));
    }
    parse(trimmed, Kind::Double).map_err(|_| StepVarsError::invalid_cast(text, "number"))
}

/// Replaces the value of an existing variable with `value` as text.
pub fn change_variable(scope: &ScopeHandle, name: &str, value: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_exists(name)?;
    store.set(name, TypedValue::string(value))?;
    Ok(())
}

pub fn empty_variable(scope: &ScopeHandle, name: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_exists(name)?;
    store.set(name, TypedValue::Null)?;
    Ok(())
}

pub fn delete_variable(scope: &ScopeHandle, name: &str) -> Result<(), StepError> {
    scope.store()?.delete(name)?;
    Ok(())
}

/// Copies the typed value of `from` into the new variable `to`.
pub fn copy_value(scope: &ScopeHandle, from: &str, to: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(to)?;
    let source = store.get(from)?;
    if source.value.is_null() {
        return Err(StepError::assertion(format!(
            "variable \"{}\" has no value to copy",
            from
        )));
    }
    store.set(to, source.value)?;
    Ok(())
}

/// Copies the rendered text of `from` into the new variable `to`.
pub fn copy_text(scope: &ScopeHandle, from: &str, to: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(to)?;
    store.require_exists(from)?;
    let text = store.get_value_text(from).ok_or_else(|| {
        StepError::assertion(format!("variable \"{}\" has no text to copy", from))
    })?;
    store.set(to, TypedValue::String(text))?;
    Ok(())
}

/// Puts the text of `name` in place of every `{name}` in `template` and
/// stores the result as `to`. Other placeholders are left as they are.
pub fn substitute_variable(
    scope: &ScopeHandle,
    name: &str,
    template: &str,
    to: &str,
) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(to)?;
    store.require_exists(name)?;
    let replacement = store.get_value_text(name).unwrap_or_default();
    let result = template.replace(&format!("{{{}}}", name), &replacement);
    debug!(variable = name, target = to, "substituted variable into template");
    store.set(to, TypedValue::String(result))?;
    Ok(())
}
