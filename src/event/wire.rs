//! Schema-driven rewriting of payload date-times between the internal and
//! wire layouts. Only declared `DateTime` fields are touched (including ones
//! inside list elements); everything else passes through as-is.

use serde_json::{Map, Value};

use crate::schema::{FieldKind, FieldSpec, StepDefinition};

use super::datetime;

#[derive(Clone, Copy)]
enum Direction {
    ToWire,
    ToInternal,
}

/// Rewrites one step's payload for the backend.
pub fn to_wire_values(
    definition: &StepDefinition,
    values: &Map<String, Value>,
) -> Map<String, Value> {
    convert_map(&definition.fields, values, Direction::ToWire)
}

/// Rewrites one step's worth of backend values for the stores.
pub fn to_internal_values(
    definition: &StepDefinition,
    values: &Map<String, Value>,
) -> Map<String, Value> {
    convert_map(&definition.fields, values, Direction::ToInternal)
}

/// Applies the wire rewrite across a merged payload spanning several steps.
/// Fields no step declares are passed through untouched.
pub fn to_wire_payload(
    definitions: &[StepDefinition],
    values: &Map<String, Value>,
) -> Map<String, Value> {
    let mut out = values.clone();
    for definition in definitions {
        out = convert_map(&definition.fields, &out, Direction::ToWire);
    }
    out
}

fn convert_map(
    fields: &[FieldSpec],
    values: &Map<String, Value>,
    direction: Direction,
) -> Map<String, Value> {
    let mut out = values.clone();
    for spec in fields {
        if let Some(value) = values.get(spec.name) {
            out.insert(spec.name.to_string(), convert_value(spec, value, direction));
        }
    }
    out
}

fn convert_value(spec: &FieldSpec, value: &Value, direction: Direction) -> Value {
    match (&spec.kind, value) {
        (FieldKind::DateTime, Value::String(raw)) => convert_datetime(raw, direction),
        (FieldKind::List(element_fields), Value::Array(entries)) => Value::Array(
            entries
                .iter()
                .map(|entry| match entry {
                    Value::Object(record) => {
                        Value::Object(convert_map(element_fields, record, direction))
                    }
                    other => other.clone(),
                })
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Unparseable strings pass through untouched so the validator or the
/// backend can complain about them instead.
fn convert_datetime(raw: &str, direction: Direction) -> Value {
    let converted = match direction {
        Direction::ToWire => datetime::parse_internal(raw).map(datetime::format_wire),
        Direction::ToInternal => datetime::parse_wire(raw).map(datetime::format_internal),
    };
    Value::String(converted.unwrap_or_else(|| raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::steps;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn details_datetimes_are_rewritten_for_the_backend() {
        let details = &steps()[0];
        let payload = object(json!({
            "title": "Conf",
            "startDateTime": "2024-12-20T09:00",
            "endDateTime": "2024-12-20T18:30",
        }));

        let wire = to_wire_values(details, &payload);
        assert_eq!(wire["title"], json!("Conf"));
        assert_eq!(wire["startDateTime"], json!("20-12-2024 09:00 AM"));
        assert_eq!(wire["endDateTime"], json!("20-12-2024 06:30 PM"));
    }

    #[test]
    fn agenda_start_times_convert_inside_list_elements() {
        let program = &steps()[2];
        let payload = object(json!({
            "agenda": [
                { "title": "Keynote", "startTime": "2024-12-20T09:30", "durationMinutes": 45 },
            ],
        }));

        let wire = to_wire_values(program, &payload);
        assert_eq!(
            wire["agenda"],
            json!([
                { "title": "Keynote", "startTime": "20-12-2024 09:30 AM", "durationMinutes": 45 },
            ])
        );

        let back = to_internal_values(program, &wire);
        assert_eq!(back["agenda"], payload["agenda"]);
    }

    #[test]
    fn unparseable_strings_pass_through() {
        let details = &steps()[0];
        let payload = object(json!({ "startDateTime": "whenever works" }));
        let wire = to_wire_values(details, &payload);
        assert_eq!(wire["startDateTime"], json!("whenever works"));
    }

    #[test]
    fn merged_payload_converts_fields_from_every_step() {
        let payload = object(json!({
            "title": "Conf",
            "startDateTime": "2024-12-20T09:00",
            "venueType": "online",
            "agenda": [
                { "title": "Keynote", "startTime": "2024-12-20T10:00", "durationMinutes": 30 },
            ],
            "unknownExtra": "kept",
        }));

        let wire = to_wire_payload(steps(), &payload);
        assert_eq!(wire["startDateTime"], json!("20-12-2024 09:00 AM"));
        assert_eq!(wire["agenda"][0]["startTime"], json!("20-12-2024 10:00 AM"));
        assert_eq!(wire["venueType"], json!("online"));
        assert_eq!(wire["unknownExtra"], json!("kept"));
    }
}
