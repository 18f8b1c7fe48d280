//! Built-in step schemas for the event wizard.

use once_cell::sync::Lazy;
use serde_json::json;

use crate::schema::{FieldKind, FieldSpec, StepDefinition};

pub const VENUE_TYPE_OPTIONS: [&str; 3] = ["online", "inPerson", "hybrid"];
pub const FIELD_TYPE_OPTIONS: [&str; 4] = ["text", "email", "number", "checkbox"];

static STEPS: Lazy<Vec<StepDefinition>> =
    Lazy::new(|| vec![details_step(), venue_step(), program_step()]);

/// The ordered step definitions of the event wizard.
pub fn steps() -> &'static [StepDefinition] {
    &STEPS
}

fn details_step() -> StepDefinition {
    StepDefinition::new(
        "details",
        1,
        "Event details",
        vec![
            FieldSpec::new("title", "Title", FieldKind::Text).with_max(120.0),
            FieldSpec::new("description", "Description", FieldKind::Text).with_max(2000.0),
            FieldSpec::new("startDateTime", "Starts at", FieldKind::DateTime),
            FieldSpec::new("endDateTime", "Ends at", FieldKind::DateTime),
            FieldSpec::new("bannerUrl", "Banner image URL", FieldKind::Url).with_optional(),
        ],
    )
}

fn venue_step() -> StepDefinition {
    StepDefinition::new(
        "venue",
        2,
        "Venue & tickets",
        vec![
            FieldSpec::new(
                "venueType",
                "Venue type",
                FieldKind::Choice(VENUE_TYPE_OPTIONS.to_vec()),
            ),
            FieldSpec::new("venueAddress", "Venue address", FieldKind::Text)
                .with_optional()
                .with_max(300.0),
            FieldSpec::new("meetingUrl", "Meeting URL", FieldKind::Url).with_optional(),
            FieldSpec::new("capacity", "Capacity", FieldKind::Number)
                .with_min(1.0)
                .with_max(100_000.0),
            FieldSpec::new("isFree", "Free event", FieldKind::Boolean),
            FieldSpec::new("price", "Ticket price", FieldKind::Number)
                .with_min(0.0)
                .with_default(json!(0)),
        ],
    )
}

fn program_step() -> StepDefinition {
    StepDefinition::new(
        "program",
        3,
        "Program",
        vec![
            FieldSpec::new(
                "speakers",
                "Speakers",
                FieldKind::List(vec![
                    FieldSpec::new("name", "Name", FieldKind::Text).with_max(80.0),
                    FieldSpec::new("bio", "Bio", FieldKind::Text)
                        .with_optional()
                        .with_max(500.0),
                    FieldSpec::new("email", "Email", FieldKind::Email).with_optional(),
                    FieldSpec::new("photoUrl", "Photo URL", FieldKind::Url).with_optional(),
                ]),
            )
            .with_optional(),
            FieldSpec::new(
                "agenda",
                "Agenda",
                FieldKind::List(vec![
                    FieldSpec::new("title", "Title", FieldKind::Text).with_max(120.0),
                    FieldSpec::new("startTime", "Starts at", FieldKind::DateTime),
                    FieldSpec::new("durationMinutes", "Duration (minutes)", FieldKind::Number)
                        .with_min(5.0)
                        .with_max(480.0),
                ]),
            )
            .with_optional(),
            FieldSpec::new(
                "registrationFields",
                "Registration fields",
                FieldKind::List(vec![
                    FieldSpec::new("label", "Label", FieldKind::Text).with_max(80.0),
                    FieldSpec::new(
                        "fieldType",
                        "Field type",
                        FieldKind::Choice(FIELD_TYPE_OPTIONS.to_vec()),
                    ),
                    FieldSpec::new("required", "Required", FieldKind::Boolean),
                ]),
            )
            .with_optional(),
        ],
    )
}
