//! Per-step form state: values, errors, dirty and validity flags.
//!
//! A store never talks to the network and never sees other steps. Writes go
//! through [`StepStore::set_value`] with a field path; anything outside the
//! step's schema is rejected, with a nearest-name suggestion when a likely
//! typo is found.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use strsim::levenshtein;

use crate::errors::WizardError;
use crate::schema::path::FieldPath;
use crate::schema::{validate_step, FieldKind, StepDefinition};

/// Store lifecycle: `Pristine → Dirty → {Valid, Invalid}`, oscillating as
/// values change; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Untouched since mount or the last reset.
    Pristine,
    /// Mutated since the last validation pass.
    Dirty,
    Valid,
    Invalid,
}

#[derive(Debug, Clone)]
pub struct StepStore {
    definition: StepDefinition,
    values: Map<String, Value>,
    errors: BTreeMap<String, String>,
    validity: Option<bool>,
    dirty: bool,
}

impl StepStore {
    /// Mounts the step with schema defaults.
    pub fn new(definition: StepDefinition) -> Self {
        let values = definition.initial_values();
        Self {
            definition,
            values,
            errors: BTreeMap::new(),
            validity: None,
            dirty: false,
        }
    }

    pub fn definition(&self) -> &StepDefinition {
        &self.definition
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Current top-level value of a field, if the store holds one.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Messages from the most recent validation pass, keyed by field path.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True only when the last validation pass succeeded and nothing changed
    /// since. A store that was never validated reports false.
    pub fn is_valid(&self) -> bool {
        self.validity == Some(true)
    }

    pub fn status(&self) -> StepStatus {
        match (self.validity, self.dirty) {
            (Some(true), _) => StepStatus::Valid,
            (Some(false), _) => StepStatus::Invalid,
            (None, true) => StepStatus::Dirty,
            (None, false) => StepStatus::Pristine,
        }
    }

    /// Writes one field, leaving every other field untouched. List paths may
    /// address one element past the end to append.
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<(), WizardError> {
        let parsed = FieldPath::parse(path)?;
        let rendered = parsed.to_string();

        match parsed {
            FieldPath::Field(name) => {
                if self.definition.field(&name).is_none() {
                    return Err(self.unknown_top_level(&name));
                }
                self.values.insert(name, value);
            }
            FieldPath::Element(name, index) => {
                self.ensure_list_kind(&name, &rendered)?;
                let entries = self.list_entries(name, index, &rendered)?;
                if index < entries.len() {
                    entries[index] = value;
                } else {
                    entries.push(value);
                }
            }
            FieldPath::Nested(name, index, sub) => {
                self.ensure_element_field(&name, &sub, &rendered)?;
                let entries = self.list_entries(name, index, &rendered)?;
                if index == entries.len() {
                    entries.push(Value::Object(Map::new()));
                }
                let Some(Value::Object(record)) = entries.get_mut(index) else {
                    return Err(WizardError::InvalidPath {
                        path: rendered,
                        reason: "element is not a record".to_string(),
                    });
                };
                record.insert(sub, value);
            }
        }

        self.dirty = true;
        self.validity = None;
        Ok(())
    }

    /// Runs the schema over the current values, refreshing the error map and
    /// the recorded outcome.
    pub fn validate(&mut self) -> bool {
        self.errors = validate_step(&self.definition, &self.values);
        let valid = self.errors.is_empty();
        self.validity = Some(valid);
        valid
    }

    /// Replaces all values wholesale and returns the store to pristine.
    /// Used when mounting an existing entity for editing.
    pub fn reset(&mut self, values: Map<String, Value>) {
        self.values = values;
        self.errors.clear();
        self.dirty = false;
        self.validity = None;
    }

    fn ensure_list_kind(&self, name: &str, rendered: &str) -> Result<(), WizardError> {
        match self.definition.field(name) {
            Some(spec) if matches!(spec.kind, FieldKind::List(_)) => Ok(()),
            Some(_) => Err(WizardError::InvalidPath {
                path: rendered.to_string(),
                reason: format!("`{name}` is not a list field"),
            }),
            None => Err(self.unknown_top_level(name)),
        }
    }

    fn ensure_element_field(
        &self,
        name: &str,
        sub: &str,
        rendered: &str,
    ) -> Result<(), WizardError> {
        let Some(spec) = self.definition.field(name) else {
            return Err(self.unknown_top_level(name));
        };
        let FieldKind::List(element_fields) = &spec.kind else {
            return Err(WizardError::InvalidPath {
                path: rendered.to_string(),
                reason: format!("`{name}` is not a list field"),
            });
        };
        if element_fields.iter().any(|field| field.name == sub) {
            return Ok(());
        }
        Err(unknown_field(
            rendered.to_string(),
            sub,
            element_fields.iter().map(|field| field.name),
        ))
    }

    /// Mutable access to a list slot, checked against `index` first so a
    /// rejected write cannot leave a half-coerced value behind. Missing and
    /// null slots count as empty lists; `index` may be at most their length.
    fn list_entries(
        &mut self,
        name: String,
        index: usize,
        rendered: &str,
    ) -> Result<&mut Vec<Value>, WizardError> {
        let len = match self.values.get(&name) {
            Some(Value::Array(entries)) => entries.len(),
            None | Some(Value::Null) => 0,
            Some(_) => {
                return Err(WizardError::InvalidPath {
                    path: rendered.to_string(),
                    reason: "current value is not a list".to_string(),
                });
            }
        };
        if index > len {
            return Err(out_of_range(rendered.to_string(), index, len));
        }

        let slot = self
            .values
            .entry(name)
            .or_insert_with(|| Value::Array(Vec::new()));
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(entries) => Ok(entries),
            _ => Err(WizardError::InvalidPath {
                path: rendered.to_string(),
                reason: "current value is not a list".to_string(),
            }),
        }
    }

    fn unknown_top_level(&self, name: &str) -> WizardError {
        unknown_field(
            name.to_string(),
            name,
            self.definition.field_names(),
        )
    }
}

fn out_of_range(path: String, index: usize, len: usize) -> WizardError {
    WizardError::InvalidPath {
        path,
        reason: format!("index {index} is out of range (list has {len} entries)"),
    }
}

fn unknown_field(
    path: String,
    wrong: &str,
    candidates: impl Iterator<Item = &'static str>,
) -> WizardError {
    let mut best: Option<(usize, &'static str)> = None;
    for candidate in candidates {
        let distance = levenshtein(wrong, candidate);
        if best.map_or(true, |(current, _)| distance < current) {
            best = Some((distance, candidate));
        }
    }
    let suggestion = best
        .filter(|(distance, _)| *distance <= 3)
        .map(|(_, candidate)| candidate.to_string());
    WizardError::UnknownField { path, suggestion }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use serde_json::json;

    fn store() -> StepStore {
        StepStore::new(StepDefinition::new(
            "guests",
            1,
            "Guest list",
            vec![
                FieldSpec::new("title", "Title", FieldKind::Text).with_max(10.0),
                FieldSpec::new("capacity", "Capacity", FieldKind::Number).with_min(1.0),
                FieldSpec::new(
                    "guests",
                    "Guests",
                    FieldKind::List(vec![
                        FieldSpec::new("name", "Name", FieldKind::Text),
                        FieldSpec::new("email", "Email", FieldKind::Email).with_optional(),
                    ]),
                )
                .with_optional(),
            ],
        ))
    }

    #[test]
    fn mounts_pristine_with_schema_defaults() {
        let store = store();
        assert_eq!(store.status(), StepStatus::Pristine);
        assert!(!store.is_dirty());
        assert!(!store.is_valid());
        assert_eq!(store.value("title"), Some(&json!("")));
        assert_eq!(store.value("guests"), Some(&json!([])));
    }

    #[test]
    fn lifecycle_oscillates_between_valid_and_invalid() {
        let mut store = store();

        store.set_value("title", json!("Launch")).unwrap();
        assert_eq!(store.status(), StepStatus::Dirty);

        assert!(!store.validate());
        assert_eq!(store.status(), StepStatus::Invalid);
        assert_eq!(store.errors()["capacity"], "capacity is required");

        store.set_value("capacity", json!(25)).unwrap();
        assert_eq!(store.status(), StepStatus::Dirty);
        assert!(store.validate());
        assert_eq!(store.status(), StepStatus::Valid);
        assert!(store.is_valid());

        store.set_value("capacity", json!(0)).unwrap();
        assert!(!store.validate());
        assert_eq!(store.status(), StepStatus::Invalid);
    }

    #[test]
    fn set_value_leaves_other_fields_untouched() {
        let mut store = store();
        store.set_value("title", json!("Launch")).unwrap();
        store.set_value("capacity", json!(25)).unwrap();
        store.set_value("title", json!("Relaunch")).unwrap();
        assert_eq!(store.value("capacity"), Some(&json!(25)));
    }

    #[test]
    fn unknown_field_comes_back_with_a_suggestion() {
        let mut store = store();
        let err = store.set_value("titel", json!("oops")).expect_err("typo");
        match err {
            WizardError::UnknownField { path, suggestion } => {
                assert_eq!(path, "titel");
                assert_eq!(suggestion.as_deref(), Some("title"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = store
            .set_value("somethingelse", json!(1))
            .expect_err("no close match");
        match err {
            WizardError::UnknownField { suggestion, .. } => assert!(suggestion.is_none()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nested_writes_append_one_past_the_end() {
        let mut store = store();
        store.set_value("guests[0].name", json!("Ada")).unwrap();
        store.set_value("guests[0].email", json!("ada@example.com")).unwrap();
        store.set_value("guests[1].name", json!("Grace")).unwrap();

        assert_eq!(
            store.value("guests"),
            Some(&json!([
                { "name": "Ada", "email": "ada@example.com" },
                { "name": "Grace" },
            ]))
        );
    }

    #[test]
    fn whole_element_writes_replace_or_append() {
        let mut store = store();
        store
            .set_value("guests[0]", json!({ "name": "Ada" }))
            .unwrap();
        store
            .set_value("guests[0]", json!({ "name": "Grace" }))
            .unwrap();
        assert_eq!(store.value("guests"), Some(&json!([{ "name": "Grace" }])));

        let err = store
            .set_value("guests[5]", json!({ "name": "Far" }))
            .expect_err("gap");
        assert!(matches!(err, WizardError::InvalidPath { .. }));
    }

    #[test]
    fn element_field_typo_suggests_the_schema_name() {
        let mut store = store();
        let err = store
            .set_value("guests[0].nmae", json!("Ada"))
            .expect_err("typo");
        match err {
            WizardError::UnknownField { path, suggestion } => {
                assert_eq!(path, "guests[0].nmae");
                assert_eq!(suggestion.as_deref(), Some("name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn indexing_into_a_scalar_field_is_rejected() {
        let mut store = store();
        let err = store.set_value("title[0]", json!("x")).expect_err("scalar");
        assert!(matches!(err, WizardError::InvalidPath { .. }));
    }

    #[test]
    fn rejected_writes_do_not_dirty_the_store() {
        let mut store = store();
        let _ = store.set_value("titel", json!("oops"));
        assert_eq!(store.status(), StepStatus::Pristine);
    }

    #[test]
    fn out_of_range_writes_leave_values_untouched() {
        let mut store = store();
        let seeded = json!({ "title": "Loaded", "capacity": 80 })
            .as_object()
            .cloned()
            .unwrap();
        store.reset(seeded.clone());

        let err = store
            .set_value("guests[3].name", json!("Far"))
            .expect_err("gap");
        assert!(matches!(err, WizardError::InvalidPath { .. }));
        assert_eq!(store.values(), &seeded);
        assert_eq!(store.status(), StepStatus::Pristine);
    }

    #[test]
    fn reset_returns_to_pristine_with_the_given_values() {
        let mut store = store();
        store.set_value("title", json!("Launch")).unwrap();
        store.validate();

        let seeded = json!({ "title": "Loaded", "capacity": 80, "guests": [] })
            .as_object()
            .cloned()
            .unwrap();
        store.reset(seeded);

        assert_eq!(store.status(), StepStatus::Pristine);
        assert!(store.errors().is_empty());
        assert_eq!(store.value("title"), Some(&json!("Loaded")));
    }
}
