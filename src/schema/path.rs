//! Field path grammar: `title`, `speakers[0]`, `speakers[0].name`.
//!
//! Paths address at most one list hop because step schemas keep list
//! elements flat. Error keys produced by the validator use the same
//! rendering, so a path parsed here always round-trips through `Display`.

use std::fmt;

use crate::errors::WizardError;

/// Parsed form of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    /// Top-level field: `title`.
    Field(String),
    /// Whole list element: `speakers[0]`.
    Element(String, usize),
    /// Field inside a list element: `speakers[0].name`.
    Nested(String, usize, String),
}

impl FieldPath {
    /// Parses a raw path string, rejecting anything outside the grammar.
    pub fn parse(raw: &str) -> Result<Self, WizardError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(invalid(raw, "path is empty"));
        }

        let Some(bracket) = raw.find('[') else {
            if raw.contains('.') {
                return Err(invalid(raw, "nested objects are only addressable inside lists"));
            }
            if raw.contains(']') {
                return Err(invalid(raw, "unmatched `]`"));
            }
            return Ok(FieldPath::Field(raw.to_string()));
        };

        let name = &raw[..bracket];
        if name.is_empty() || name.contains('.') {
            return Err(invalid(raw, "list index must follow a field name"));
        }

        let rest = &raw[bracket + 1..];
        let Some(close) = rest.find(']') else {
            return Err(invalid(raw, "unmatched `[`"));
        };
        let index: usize = rest[..close]
            .parse()
            .map_err(|_| invalid(raw, "list index must be a non-negative integer"))?;

        let tail = &rest[close + 1..];
        if tail.is_empty() {
            return Ok(FieldPath::Element(name.to_string(), index));
        }

        let Some(sub) = tail.strip_prefix('.') else {
            return Err(invalid(raw, "expected `.` after the list index"));
        };
        if sub.is_empty() || sub.contains(['.', '[', ']']) {
            return Err(invalid(raw, "element fields must be plain names"));
        }

        Ok(FieldPath::Nested(name.to_string(), index, sub.to_string()))
    }

    /// Name of the top-level field the path enters through.
    pub fn root(&self) -> &str {
        match self {
            FieldPath::Field(name) | FieldPath::Element(name, _) | FieldPath::Nested(name, _, _) => {
                name
            }
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Field(name) => write!(f, "{name}"),
            FieldPath::Element(name, index) => write!(f, "{name}[{index}]"),
            FieldPath::Nested(name, index, sub) => write!(f, "{name}[{index}].{sub}"),
        }
    }
}

fn invalid(path: &str, reason: &str) -> WizardError {
    WizardError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Renders the error key for a whole list element.
pub fn element_path(base: &str, index: usize) -> String {
    format!("{base}[{index}]")
}

/// Renders the error key for a field inside a list element.
pub fn nested_path(base: &str, index: usize, sub: &str) -> String {
    format!("{base}[{index}].{sub}")
}
