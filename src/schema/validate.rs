//! Pure validation of step values against their schema.
//!
//! Validation never fails as an operation: the result is always a map of
//! error messages keyed by field path, empty when the payload is compliant.
//! Unknown keys in the payload are ignored; only declared fields are checked.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use regex::Regex;
use serde_json::{Map, Value};

use super::path::{element_path, nested_path};
use super::{FieldKind, FieldSpec, StepDefinition};

/// Date-time layout used inside stores and payloads.
pub const INTERNAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Validates every declared field of a step against the supplied values.
/// Missing keys are treated as unanswered fields.
pub fn validate_step(
    definition: &StepDefinition,
    values: &Map<String, Value>,
) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    let missing = Value::Null;
    for field in &definition.fields {
        let value = values.get(field.name).unwrap_or(&missing);
        validate_field(field, field.name, value, &mut errors);
    }
    errors
}

fn validate_field(
    spec: &FieldSpec,
    path: &str,
    value: &Value,
    errors: &mut BTreeMap<String, String>,
) {
    if is_blank(value) {
        if spec.required {
            errors.insert(path.to_string(), format!("{path} is required"));
        }
        return;
    }

    match &spec.kind {
        FieldKind::Text => {
            let Value::String(text) = value else {
                errors.insert(path.to_string(), format!("{path} must be text"));
                return;
            };
            check_string_constraints(spec, path, text, errors);
        }
        FieldKind::Email => {
            let Value::String(text) = value else {
                errors.insert(path.to_string(), format!("{path} must be text"));
                return;
            };
            if !is_valid_email(text) {
                errors.insert(
                    path.to_string(),
                    format!("{path} must be a valid email address"),
                );
                return;
            }
            check_string_constraints(spec, path, text, errors);
        }
        FieldKind::Url => {
            let Value::String(text) = value else {
                errors.insert(path.to_string(), format!("{path} must be text"));
                return;
            };
            if !is_valid_url(text) {
                errors.insert(path.to_string(), format!("{path} must be a valid URL"));
                return;
            }
            check_string_constraints(spec, path, text, errors);
        }
        FieldKind::Number => {
            let Some(number) = value.as_f64() else {
                errors.insert(path.to_string(), format!("{path} must be a number"));
                return;
            };
            check_number_bounds(spec, path, number, errors);
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                errors.insert(path.to_string(), format!("{path} must be true or false"));
            }
        }
        FieldKind::Choice(options) => {
            let accepted = match value {
                Value::String(text) => options.iter().any(|option| option == text),
                _ => false,
            };
            if !accepted {
                errors.insert(
                    path.to_string(),
                    format!("{path} must be one of: {}", options.join(", ")),
                );
            }
        }
        FieldKind::DateTime => {
            let parsed = value.as_str().and_then(parse_internal_datetime);
            if parsed.is_none() {
                errors.insert(
                    path.to_string(),
                    format!("{path} must be a valid date-time (YYYY-MM-DDTHH:MM)"),
                );
            }
        }
        FieldKind::List(element_fields) => {
            let Value::Array(entries) = value else {
                errors.insert(path.to_string(), format!("{path} must be a list"));
                return;
            };
            check_list_bounds(spec, path, entries.len(), errors);
            for (index, entry) in entries.iter().enumerate() {
                let Value::Object(record) = entry else {
                    let key = element_path(path, index);
                    errors.insert(key.clone(), format!("{key} must be a record"));
                    continue;
                };
                let missing = Value::Null;
                for sub in element_fields {
                    let sub_path = nested_path(path, index, sub.name);
                    let sub_value = record.get(sub.name).unwrap_or(&missing);
                    validate_field(sub, &sub_path, sub_value, errors);
                }
            }
        }
    }
}

/// Null, blank strings, and empty arrays all count as unanswered.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(entries) => entries.is_empty(),
        _ => false,
    }
}

fn check_string_constraints(
    spec: &FieldSpec,
    path: &str,
    text: &str,
    errors: &mut BTreeMap<String, String>,
) {
    let length = text.chars().count();
    if let Some(min) = spec.constraints.min {
        if (length as f64) < min {
            errors.insert(
                path.to_string(),
                format!("{path} must be at least {} characters", format_bound(min)),
            );
            return;
        }
    }
    if let Some(max) = spec.constraints.max {
        if (length as f64) > max {
            errors.insert(
                path.to_string(),
                format!("{path} cannot exceed {} characters", format_bound(max)),
            );
            return;
        }
    }
    if let Some(pattern) = spec.constraints.pattern {
        match Regex::new(pattern) {
            Ok(regex) => {
                if !regex.is_match(text) {
                    errors.insert(
                        path.to_string(),
                        format!("{path} is not in the expected format"),
                    );
                }
            }
            Err(error) => {
                tracing::warn!(field = spec.name, %error, "skipping unparseable field pattern");
            }
        }
    }
}

fn check_number_bounds(
    spec: &FieldSpec,
    path: &str,
    number: f64,
    errors: &mut BTreeMap<String, String>,
) {
    if let Some(min) = spec.constraints.min {
        if number < min {
            let message = if min == 0.0 {
                format!("{path} cannot be negative")
            } else {
                format!("{path} must be at least {}", format_bound(min))
            };
            errors.insert(path.to_string(), message);
            return;
        }
    }
    if let Some(max) = spec.constraints.max {
        if number > max {
            errors.insert(
                path.to_string(),
                format!("{path} must be at most {}", format_bound(max)),
            );
        }
    }
}

fn check_list_bounds(
    spec: &FieldSpec,
    path: &str,
    count: usize,
    errors: &mut BTreeMap<String, String>,
) {
    if let Some(min) = spec.constraints.min {
        if (count as f64) < min {
            errors.insert(
                path.to_string(),
                format!("{path} must have at least {} entries", format_bound(min)),
            );
            return;
        }
    }
    if let Some(max) = spec.constraints.max {
        if (count as f64) > max {
            errors.insert(
                path.to_string(),
                format!("{path} must have at most {} entries", format_bound(max)),
            );
        }
    }
}

/// Accepts `YYYY-MM-DDTHH:MM` with an optional seconds component.
pub fn parse_internal_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, INTERNAL_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Scheme plus non-empty host is enough; full RFC parsing is the backend's
/// problem.
fn is_valid_url(raw: &str) -> bool {
    let rest = match raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
    {
        Some(rest) => rest,
        None => return false,
    };
    let host = rest
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or("");
    !host.is_empty() && !host.contains(char::is_whitespace)
}

fn is_valid_email(raw: &str) -> bool {
    if raw.contains(char::is_whitespace) {
        return false;
    }
    let mut parts = raw.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

/// Renders a numeric bound without a trailing `.0`.
fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
