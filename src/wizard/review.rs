//! Final review: merge every step into one payload and gate the save.
//!
//! The aggregator re-runs validation on every store instead of trusting
//! recorded flags, so values loaded for editing and never touched still get
//! checked before anything reaches the backend.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::errors::WizardError;
use crate::gateway::{EntityId, SyncGateway};
use crate::wizard::orchestrator::Wizard;

/// Outcome of a full-wizard review pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewReport {
    /// All step values merged into one flat payload. On key collisions the
    /// later step wins.
    pub payload: Map<String, Value>,
    /// Outstanding validation messages grouped by step, empty when the
    /// wizard is ready to save.
    pub errors_by_step: BTreeMap<usize, Vec<String>>,
}

impl ReviewReport {
    pub fn is_ready(&self) -> bool {
        self.errors_by_step.is_empty()
    }

    /// One line per step with its messages, for logs and review screens.
    pub fn render_errors(&self) -> String {
        self.errors_by_step
            .iter()
            .map(|(step, messages)| format!("step {step}: {}", messages.join("; ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct ReviewAggregator;

impl ReviewAggregator {
    /// Revalidates every step and merges their values. Invalid steps still
    /// contribute values, so the review screen can show what is there.
    pub fn collect_all<G: SyncGateway>(wizard: &mut Wizard<G>) -> ReviewReport {
        let mut payload = Map::new();
        let mut errors_by_step = BTreeMap::new();

        for (position, store) in wizard.steps_mut().iter_mut().enumerate() {
            let step = position + 1;
            if !store.validate() {
                errors_by_step.insert(step, store.errors().values().cloned().collect());
            }
            for (name, value) in store.values() {
                payload.insert(name.clone(), value.clone());
            }
        }

        ReviewReport {
            payload,
            errors_by_step,
        }
    }

    /// Final save: refuses while any step is invalid, requires the entity id
    /// minted by step 1, then finalizes through the gateway.
    pub fn save<G: SyncGateway>(wizard: &mut Wizard<G>) -> Result<EntityId, WizardError> {
        let report = Self::collect_all(wizard);
        if !report.is_ready() {
            tracing::debug!(
                session = %wizard.session_id(),
                steps = report.errors_by_step.len(),
                "save refused with outstanding errors"
            );
            return Err(WizardError::ReviewRejected {
                errors_by_step: report.errors_by_step,
            });
        }

        let Some(entity_id) = wizard.entity_id().cloned() else {
            return Err(WizardError::MissingEntityId("final save".to_string()));
        };

        wizard.gateway().finalize(&entity_id, &report.payload)?;
        tracing::info!(session = %wizard.session_id(), entity = %entity_id, "entity finalized");
        Ok(entity_id)
    }
}
