use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use sv_core::{Kind, StepVarsError, TypedValue};

/// Text produced for a `Null` value.
pub const NO_VALUE_TEXT: &str = "";

pub const RENDER_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    RENDER_DATETIME_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
];

const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

pub fn parse(text: &str, kind: Kind) -> Result<TypedValue, StepVarsError> {
    let cast_error = || StepVarsError::invalid_cast(text, kind.name());
    match kind {
        Kind::String => Ok(TypedValue::String(text.to_string())),
        Kind::Object => Ok(TypedValue::Object(serde_json::Value::String(
            text.to_string(),
        ))),
        Kind::Int => text
            .trim()
            .parse::<i32>()
            .map(TypedValue::Int)
            .map_err(|_| cast_error()),
        Kind::Long => text
            .trim()
            .parse::<i64>()
            .map(TypedValue::Long)
            .map_err(|_| cast_error()),
        Kind::Float => parse_decimal::<f32>(text)
            .map(TypedValue::Float)
            .ok_or_else(cast_error),
        Kind::Double => parse_decimal::<f64>(text)
            .map(TypedValue::Double)
            .ok_or_else(cast_error),
        Kind::Bool => {
            let trimmed = text.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(TypedValue::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(TypedValue::Bool(false))
            } else {
                Err(cast_error())
            }
        }
        Kind::DateTime => parse_datetime(text, None).map(TypedValue::DateTime),
        Kind::Sequence => {
            let items = if text.is_empty() {
                Vec::new()
            } else {
                text.split(',').map(TypedValue::string).collect()
            };
            TypedValue::sequence(Kind::String, items)
        }
        Kind::Mapping => {
            let mut entries = IndexMap::new();
            if !text.is_empty() {
                for pair in text.split(',') {
                    let (key, value) = pair.split_once(':').ok_or_else(cast_error)?;
                    entries.insert(key.to_string(), TypedValue::string(value));
                }
            }
            TypedValue::mapping(Kind::String, entries)
        }
    }
}

pub fn parse_named(text: &str, kind_name: &str) -> Result<TypedValue, StepVarsError> {
    parse(text, Kind::from_name(kind_name)?)
}

/// Invariant `.` decimal first, then a decimal-comma reading of the same
/// literal before giving up.
fn parse_decimal<T: std::str::FromStr>(text: &str) -> Option<T> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<T>() {
        return Some(value);
    }
    if trimmed.matches(',').count() != 1 || trimmed.contains('.') {
        return None;
    }
    trimmed.replace(',', ".").parse::<T>().ok()
}

pub fn parse_datetime(text: &str, format: Option<&str>) -> Result<NaiveDateTime, StepVarsError> {
    let trimmed = text.trim();
    let explicit;
    let (datetime_formats, date_formats): (&[&str], &[&str]) = match format {
        Some(format) => {
            explicit = [format];
            (&explicit, &explicit)
        }
        None => (DEFAULT_DATETIME_FORMATS, DEFAULT_DATE_FORMATS),
    };

    for format in datetime_formats {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    for format in date_formats {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(parsed.and_time(NaiveTime::MIN));
        }
    }
    Err(StepVarsError::invalid_cast(text, Kind::DateTime.name()))
}

/// Parses every cell as `kind`; the first failing cell aborts the whole
/// sequence.
pub fn parse_sequence<S: AsRef<str>>(cells: &[S], kind: Kind) -> Result<TypedValue, StepVarsError> {
    let items = cells
        .iter()
        .map(|cell| parse(cell.as_ref(), kind))
        .collect::<Result<Vec<_>, _>>()?;
    TypedValue::sequence(kind, items)
}

/// Splits on any of the characters in `separators`, keeping empty pieces.
pub fn split_to_sequence(text: &str, separators: &str) -> TypedValue {
    let items = if separators.is_empty() {
        vec![TypedValue::string(text)]
    } else {
        text.split(|ch: char| separators.contains(ch))
            .map(TypedValue::string)
            .collect()
    };
    TypedValue::Sequence {
        element_kind: Kind::String,
        items,
    }
}

pub fn render(value: &TypedValue) -> String {
    match value {
        TypedValue::Null => NO_VALUE_TEXT.to_string(),
        TypedValue::String(value) => value.clone(),
        TypedValue::Int(value) => value.to_string(),
        TypedValue::Long(value) => value.to_string(),
        TypedValue::Float(value) => value.to_string(),
        TypedValue::Double(value) => value.to_string(),
        TypedValue::Bool(value) => value.to_string(),
        TypedValue::DateTime(value) => value.format(RENDER_DATETIME_FORMAT).to_string(),
        TypedValue::Object(serde_json::Value::String(value)) => value.clone(),
        TypedValue::Object(value) => value.to_string(),
        TypedValue::Sequence { items, .. } => items
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join(","),
        TypedValue::Mapping { entries, .. } => entries
            .iter()
            .map(|(key, value)| format!("{}:{}", key, render(value)))
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// `None` for `Null`, otherwise the rendered text.
pub fn render_present(value: &TypedValue) -> Option<String> {
    if value.is_null() {
        None
    } else {
        Some(render(value))
    }
}
