//! The concrete event wizard: typed entity, built-in step schemas, and the
//! wire codec for the backend's formats.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::WizardError;
use crate::gateway::{EntityId, RemoteError, SyncGateway};
use crate::wizard::Wizard;

pub mod datetime;
mod steps;
pub mod wire;

pub use steps::{steps, FIELD_TYPE_OPTIONS, VENUE_TYPE_OPTIONS};

/// Venue arrangement for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VenueType {
    Online,
    InPerson,
    Hybrid,
}

impl VenueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueType::Online => "online",
            VenueType::InPerson => "inPerson",
            VenueType::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    pub title: String,
    #[serde(with = "datetime::wire_serde")]
    pub start_time: NaiveDateTime,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationFieldKind {
    Text,
    Email,
    Number,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationField {
    pub label: String,
    pub field_type: RegistrationFieldKind,
    pub required: bool,
}

/// Full event entity as the backend returns it. Date-times deserialize from
/// the wire layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    #[serde(with = "datetime::wire_serde")]
    pub start_date_time: NaiveDateTime,
    #[serde(with = "datetime::wire_serde")]
    pub end_date_time: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    pub venue_type: VenueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_url: Option<String>,
    pub capacity: u32,
    pub is_free: bool,
    pub price: f64,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub agenda: Vec<AgendaItem>,
    #[serde(default)]
    pub registration_fields: Vec<RegistrationField>,
}

impl Event {
    /// Decomposes the entity into per-step store values, internal layouts
    /// throughout. Optional fields come back as their schema defaults so the
    /// stores always hold every declared key.
    pub fn step_values(&self) -> Vec<Map<String, Value>> {
        let mut details = Map::new();
        details.insert("title".to_string(), json!(self.title));
        details.insert("description".to_string(), json!(self.description));
        details.insert(
            "startDateTime".to_string(),
            json!(datetime::format_internal(self.start_date_time)),
        );
        details.insert(
            "endDateTime".to_string(),
            json!(datetime::format_internal(self.end_date_time)),
        );
        details.insert(
            "bannerUrl".to_string(),
            json!(self.banner_url.clone().unwrap_or_default()),
        );

        let mut venue = Map::new();
        venue.insert("venueType".to_string(), json!(self.venue_type.as_str()));
        venue.insert(
            "venueAddress".to_string(),
            json!(self.venue_address.clone().unwrap_or_default()),
        );
        venue.insert(
            "meetingUrl".to_string(),
            json!(self.meeting_url.clone().unwrap_or_default()),
        );
        venue.insert("capacity".to_string(), json!(self.capacity));
        venue.insert("isFree".to_string(), json!(self.is_free));
        venue.insert("price".to_string(), json!(self.price));

        let speakers: Vec<Value> = self.speakers.iter().map(speaker_value).collect();
        let agenda: Vec<Value> = self.agenda.iter().map(agenda_value).collect();
        let registration_fields: Vec<Value> = self
            .registration_fields
            .iter()
            .map(|field| {
                json!({
                    "label": field.label,
                    "fieldType": field.field_type,
                    "required": field.required,
                })
            })
            .collect();

        let mut program = Map::new();
        program.insert("speakers".to_string(), Value::Array(speakers));
        program.insert("agenda".to_string(), Value::Array(agenda));
        program.insert(
            "registrationFields".to_string(),
            Value::Array(registration_fields),
        );

        vec![details, venue, program]
    }
}

fn speaker_value(speaker: &Speaker) -> Value {
    let mut record = Map::new();
    record.insert("name".to_string(), json!(speaker.name));
    if let Some(bio) = &speaker.bio {
        record.insert("bio".to_string(), json!(bio));
    }
    if let Some(email) = &speaker.email {
        record.insert("email".to_string(), json!(email));
    }
    if let Some(photo_url) = &speaker.photo_url {
        record.insert("photoUrl".to_string(), json!(photo_url));
    }
    Value::Object(record)
}

fn agenda_value(item: &AgendaItem) -> Value {
    json!({
        "title": item.title,
        "startTime": datetime::format_internal(item.start_time),
        "durationMinutes": item.duration_minutes,
    })
}

/// Mounts a create-mode wizard over the standard event steps.
pub fn create_wizard<G: SyncGateway>(gateway: G) -> Wizard<G> {
    Wizard::create(gateway, steps().to_vec())
}

/// Mounts an edit-mode wizard seeded from an already-fetched entity.
pub fn edit_wizard<G: SyncGateway>(gateway: G, event: &Event) -> Wizard<G> {
    Wizard::edit(gateway, steps().to_vec(), event.id.clone(), event.step_values())
}

/// Fetches an entity and mounts the edit wizard over it in one call.
pub fn load_for_edit<G: SyncGateway>(
    gateway: G,
    entity_id: &EntityId,
) -> Result<Wizard<G>, WizardError> {
    let raw = gateway.fetch_entity(entity_id)?;
    let event: Event =
        serde_json::from_value(raw).map_err(|err| RemoteError::Decode(err.to_string()))?;
    Ok(edit_wizard(gateway, &event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_step;
    use chrono::NaiveDate;
    use serde_json::json;

    fn sample_event() -> Event {
        Event {
            id: EntityId::new("evt_42"),
            title: "Rust Meetup".to_string(),
            description: "Monthly get-together.".to_string(),
            start_date_time: NaiveDate::from_ymd_opt(2024, 12, 20)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            end_date_time: NaiveDate::from_ymd_opt(2024, 12, 20)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
            banner_url: Some("https://example.com/banner.png".to_string()),
            venue_type: VenueType::InPerson,
            venue_address: Some("1 Main St".to_string()),
            meeting_url: None,
            capacity: 120,
            is_free: false,
            price: 25.0,
            speakers: vec![Speaker {
                name: "Ada".to_string(),
                bio: Some("Keynote speaker.".to_string()),
                email: Some("ada@example.com".to_string()),
                photo_url: None,
            }],
            agenda: vec![AgendaItem {
                title: "Keynote".to_string(),
                start_time: NaiveDate::from_ymd_opt(2024, 12, 20)
                    .unwrap()
                    .and_hms_opt(9, 30, 0)
                    .unwrap(),
                duration_minutes: 45,
            }],
            registration_fields: vec![RegistrationField {
                label: "Company".to_string(),
                field_type: RegistrationFieldKind::Text,
                required: false,
            }],
        }
    }

    #[test]
    fn entity_round_trips_through_the_wire_layout() {
        let event = sample_event();
        let raw = serde_json::to_value(&event).unwrap();
        assert_eq!(raw["startDateTime"], json!("20-12-2024 09:00 AM"));
        assert_eq!(raw["endDateTime"], json!("20-12-2024 06:00 PM"));
        assert_eq!(raw["agenda"][0]["startTime"], json!("20-12-2024 09:30 AM"));
        assert_eq!(raw["venueType"], json!("inPerson"));
        assert_eq!(raw["registrationFields"][0]["fieldType"], json!("text"));

        let back: Event = serde_json::from_value(raw).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn malformed_wire_datetime_fails_to_deserialize() {
        let mut raw = serde_json::to_value(sample_event()).unwrap();
        raw["startDateTime"] = json!("2024-12-20T09:00");
        let result: Result<Event, _> = serde_json::from_value(raw);
        assert!(result.is_err());
    }

    #[test]
    fn step_values_use_internal_layouts() {
        let values = sample_event().step_values();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0]["startDateTime"], json!("2024-12-20T09:00"));
        assert_eq!(values[1]["venueType"], json!("inPerson"));
        assert_eq!(
            values[2]["agenda"][0]["startTime"],
            json!("2024-12-20T09:30")
        );
    }

    #[test]
    fn decomposed_values_validate_clean_on_every_step() {
        let values = sample_event().step_values();
        for (definition, step_values) in steps().iter().zip(&values) {
            let errors = validate_step(definition, step_values);
            assert!(errors.is_empty(), "{}: {errors:?}", definition.id);
        }
    }

    #[test]
    fn absent_optionals_decompose_to_schema_defaults() {
        let mut event = sample_event();
        event.banner_url = None;
        event.venue_address = None;

        let values = event.step_values();
        assert_eq!(values[0]["bannerUrl"], json!(""));
        assert_eq!(values[1]["venueAddress"], json!(""));
    }

    #[test]
    fn venue_type_serde_names_match_the_choice_options() {
        let variants = [VenueType::Online, VenueType::InPerson, VenueType::Hybrid];
        for (variant, option) in variants.iter().zip(VENUE_TYPE_OPTIONS) {
            assert_eq!(serde_json::to_value(variant).unwrap(), json!(option));
            assert_eq!(variant.as_str(), option);
        }
    }

    #[test]
    fn registration_kind_serde_names_match_the_choice_options() {
        let variants = [
            RegistrationFieldKind::Text,
            RegistrationFieldKind::Email,
            RegistrationFieldKind::Number,
            RegistrationFieldKind::Checkbox,
        ];
        for (variant, option) in variants.iter().zip(FIELD_TYPE_OPTIONS) {
            assert_eq!(serde_json::to_value(variant).unwrap(), json!(option));
        }
    }
}
