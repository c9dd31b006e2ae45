use sv_core::{Kind, TypedValue};
use sv_runtime::{
    at_index, by_key, parse_sequence, random_from_mapping, random_from_sequence,
    split_to_sequence, ScopeHandle,
};

use crate::error::StepError;
use crate::table::StepTable;

/// Stores the table's single row as a sequence of untyped text cells.
pub fn store_sequence(scope: &ScopeHandle, name: &str, table: &StepTable) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let items = table
        .to_sequence(scope)?
        .into_iter()
        .map(TypedValue::string)
        .collect();
    store.set(name, TypedValue::sequence(Kind::Object, items)?)?;
    Ok(())
}

/// Parses every cell as `kind_name`; nothing is stored if any cell fails.
pub fn store_typed_sequence(
    scope: &ScopeHandle,
    kind_name: &str,
    name: &str,
    table: &StepTable,
) -> Result<(), StepError> {
    let kind = Kind::from_name(kind_name)?;
    let store = scope.store()?;
    store.require_absent(name)?;
    let cells = table.to_sequence(scope)?;
    store.set(name, parse_sequence(&cells, kind)?)?;
    Ok(())
}

pub fn store_random_element(scope: &ScopeHandle, collection: &str, name: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let variable = store.get(collection)?;
    let picked = scope.with_rng(|rng| random_from_sequence(&variable, rng))??;
    store.set(name, picked)?;
    Ok(())
}

/// `index` is zero-based text, interpolated before parsing.
pub fn store_element_at(
    scope: &ScopeHandle,
    collection: &str,
    index: &str,
    name: &str,
) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let resolved = scope.resolve(index)?;
    let position = resolved
        .trim()
        .parse::<usize>()
        .map_err(|_| StepError::InvalidIndex { value: resolved.clone() })?;
    let variable = store.get(collection)?;
    store.set(name, at_index(&variable, position)?)?;
    Ok(())
}

/// Splits the text of `name` on any of `separators` into the new string
/// sequence `target`.
pub fn split_into_sequence(
    scope: &ScopeHandle,
    name: &str,
    separators: &str,
    target: &str,
) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(target)?;
    store.require_exists(name)?;
    let text = store.get_value_text(name).ok_or_else(|| {
        StepError::assertion(format!("variable \"{}\" has no text to split", name))
    })?;
    store.set(target, split_to_sequence(&text, separators))?;
    Ok(())
}

/// Stores a mapping built from a header of keys and one row of values.
pub fn store_mapping(scope: &ScopeHandle, name: &str, table: &StepTable) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let entries = table
        .to_mapping(scope)?
        .into_iter()
        .map(|(key, value)| (key, TypedValue::String(value)))
        .collect();
    store.set(name, TypedValue::mapping(Kind::Object, entries)?)?;
    Ok(())
}

pub fn store_random_value(scope: &ScopeHandle, mapping: &str, name: &str) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let variable = store.get(mapping)?;
    let picked = scope.with_rng(|rng| random_from_mapping(&variable, rng))??;
    store.set(name, picked)?;
    Ok(())
}

pub fn store_value_by_key(
    scope: &ScopeHandle,
    mapping: &str,
    key: &str,
    name: &str,
) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let key = scope.resolve_or_literal(key)?;
    let variable = store.get(mapping)?;
    store.set(name, by_key(&variable, &key)?)?;
    Ok(())
}
