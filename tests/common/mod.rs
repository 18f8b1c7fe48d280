#![allow(dead_code)]

use serde_json::{json, Map, Value};

use event_wizard::{
    gateway::{EntityId, InMemoryGateway, SyncGateway},
    wizard::Wizard,
};

pub fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object literal")
}

/// Compliant values for the details step, internal layouts throughout.
pub fn valid_details() -> Map<String, Value> {
    object(json!({
        "title": "Rust Conf 2025",
        "description": "Two days of talks and workshops.",
        "startDateTime": "2025-03-01T09:00",
        "endDateTime": "2025-03-02T17:00",
        "bannerUrl": "https://example.com/banner.png",
    }))
}

/// Compliant values for the venue step.
pub fn valid_venue() -> Map<String, Value> {
    object(json!({
        "venueType": "hybrid",
        "venueAddress": "12 Harbor Way",
        "meetingUrl": "https://meet.example.com/conf",
        "capacity": 300,
        "isFree": false,
        "price": 49.0,
    }))
}

/// Compliant values for the program step.
pub fn valid_program() -> Map<String, Value> {
    object(json!({
        "speakers": [
            { "name": "Ada", "email": "ada@example.com" },
        ],
        "agenda": [
            { "title": "Opening keynote", "startTime": "2025-03-01T09:30", "durationMinutes": 45 },
        ],
        "registrationFields": [
            { "label": "Company", "fieldType": "text", "required": false },
        ],
    }))
}

/// Writes every entry onto the wizard's active step.
pub fn fill_active_step<G: SyncGateway>(wizard: &mut Wizard<G>, values: Map<String, Value>) {
    for (path, value) in values {
        wizard.set_value(&path, value).expect("set field");
    }
}

/// A full entity exactly as the backend would return it, wire layouts
/// included.
pub fn wire_event_json() -> Value {
    json!({
        "id": "evt_42",
        "title": "Rust Meetup",
        "description": "Monthly get-together.",
        "startDateTime": "20-12-2024 09:00 AM",
        "endDateTime": "20-12-2024 06:00 PM",
        "bannerUrl": "https://example.com/banner.png",
        "venueType": "inPerson",
        "venueAddress": "1 Main St",
        "capacity": 120,
        "isFree": false,
        "price": 25.0,
        "speakers": [
            { "name": "Ada", "bio": "Keynote speaker.", "email": "ada@example.com" },
        ],
        "agenda": [
            { "title": "Keynote", "startTime": "20-12-2024 09:30 AM", "durationMinutes": 45 },
        ],
        "registrationFields": [
            { "label": "Company", "fieldType": "text", "required": false },
        ],
    })
}

/// Gateway pre-loaded with the sample entity; returns its id alongside.
pub fn seeded_gateway() -> (InMemoryGateway, EntityId) {
    let gateway = InMemoryGateway::new();
    let id = EntityId::new("evt_42");
    gateway.seed_entity(id.clone(), wire_event_json());
    (gateway, id)
}
