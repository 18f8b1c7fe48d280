#![doc(test(attr(deny(warnings))))]

//! Event Wizard provides the multi-step form machinery behind event creation
//! and editing: declarative step schemas with validation, per-step form
//! stores, a navigation orchestrator, remote step persistence, and final
//! review aggregation.

pub mod errors;
pub mod event;
pub mod gateway;
pub mod schema;
pub mod utils;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Event Wizard tracing initialized.");
    });
}
