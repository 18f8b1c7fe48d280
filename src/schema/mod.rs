//! Static descriptions of wizard steps and their field sets.
//!
//! Definitions are built once at startup and never mutated afterwards; the
//! validator and the step stores treat them as read-only schemas. Concrete
//! step sets (the event wizard's three steps) live in [`crate::event`].

use serde_json::{Map, Value};

pub mod path;
pub mod validate;

pub use path::FieldPath;
pub use validate::validate_step;

/// Supported data kinds for wizard fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Email,
    Url,
    Number,
    Boolean,
    Choice(Vec<&'static str>),
    DateTime,
    /// Ordered sequence of composite records, each validated against the
    /// element sub-schema. Error paths are namespaced `field[index].sub`.
    List(Vec<FieldSpec>),
}

/// Declarative bounds attached to a field.
///
/// `min`/`max` bound numeric values, character counts for string kinds, and
/// element counts for lists. `pattern` is a regular expression applied to
/// non-empty string values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<&'static str>,
}

/// Declarative description of a single wizard field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub constraints: Constraints,
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            constraints: Constraints::default(),
            default: None,
        }
    }

    pub fn with_optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.constraints.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.constraints.max = Some(max);
        self
    }

    pub fn with_pattern(mut self, pattern: &'static str) -> Self {
        self.constraints.pattern = Some(pattern);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Value a fresh store seeds this field with: the declared default when
    /// present, otherwise the kind default (empty string for string kinds,
    /// `false` for booleans, empty array for lists, `null` elsewhere).
    pub fn initial_value(&self) -> Value {
        if let Some(default) = &self.default {
            return default.clone();
        }
        match &self.kind {
            FieldKind::Text | FieldKind::Email | FieldKind::Url => Value::String(String::new()),
            FieldKind::Boolean => Value::Bool(false),
            FieldKind::List(_) => Value::Array(Vec::new()),
            FieldKind::Number | FieldKind::Choice(_) | FieldKind::DateTime => Value::Null,
        }
    }
}

/// Ordered field set for one wizard step. `index` is the 1-based position
/// the orchestrator mounts the step at.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDefinition {
    pub id: &'static str,
    pub index: usize,
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl StepDefinition {
    pub fn new(
        id: &'static str,
        index: usize,
        title: &'static str,
        fields: Vec<FieldSpec>,
    ) -> Self {
        Self {
            id,
            index,
            title,
            fields,
        }
    }

    /// Looks up a field spec by wire name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    /// Seed values for a store mounting this step without an entity.
    pub fn initial_values(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| (field.name.to_string(), field.initial_value()))
            .collect()
    }
}
