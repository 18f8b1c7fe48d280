//! Step orchestration: one active step, guarded navigation, per-step
//! persistence through the gateway.
//!
//! Create and edit flows run through the same machine; the only differences
//! are the seeded values and whether an entity id exists from the start.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::WizardError;
use crate::gateway::{EntityId, RemoteError, SyncGateway};
use crate::schema::StepDefinition;
use crate::wizard::store::{StepStatus, StepStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit,
}

/// Result of a successful step submission.
#[derive(Debug, Clone, PartialEq)]
pub struct StepAdvance {
    /// The step that was persisted.
    pub step: usize,
    /// Where the wizard now stands (the last step advances onto itself).
    pub current_step: usize,
    pub entity_id: EntityId,
}

/// The wizard state machine. Steps are numbered `1..=N`; exactly one is
/// active at a time. Navigation backwards is always allowed, forward
/// movement only through validation, and every completed step goes through
/// the gateway before the cursor moves.
#[derive(Debug)]
pub struct Wizard<G: SyncGateway> {
    session_id: Uuid,
    mode: WizardMode,
    gateway: G,
    steps: Vec<StepStore>,
    current: usize,
    completed: BTreeSet<usize>,
    entity_id: Option<EntityId>,
}

impl<G: SyncGateway> Wizard<G> {
    /// Mounts a create-mode wizard on step 1 with schema defaults.
    ///
    /// # Panics
    /// Panics when `definitions` is empty.
    pub fn create(gateway: G, definitions: Vec<StepDefinition>) -> Self {
        assert!(!definitions.is_empty(), "a wizard needs at least one step");
        let steps: Vec<StepStore> = definitions.into_iter().map(StepStore::new).collect();
        let session_id = Uuid::new_v4();
        tracing::info!(session = %session_id, steps = steps.len(), "create wizard mounted");
        Self {
            session_id,
            mode: WizardMode::Create,
            gateway,
            steps,
            current: 1,
            completed: BTreeSet::new(),
            entity_id: None,
        }
    }

    /// Mounts an edit-mode wizard seeded with an existing entity's values.
    /// Every step starts pristine and counts as completed, since the entity
    /// is already persisted.
    ///
    /// # Panics
    /// Panics when `definitions` is empty.
    pub fn edit(
        gateway: G,
        definitions: Vec<StepDefinition>,
        entity_id: EntityId,
        step_values: Vec<Map<String, Value>>,
    ) -> Self {
        assert!(!definitions.is_empty(), "a wizard needs at least one step");
        let mut steps: Vec<StepStore> = definitions.into_iter().map(StepStore::new).collect();
        for (store, values) in steps.iter_mut().zip(step_values) {
            store.reset(values);
        }
        let completed = (1..=steps.len()).collect();
        let session_id = Uuid::new_v4();
        tracing::info!(
            session = %session_id,
            entity = %entity_id,
            steps = steps.len(),
            "edit wizard mounted"
        );
        Self {
            session_id,
            mode: WizardMode::Edit,
            gateway,
            steps,
            current: 1,
            completed,
            entity_id: Some(entity_id),
        }
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn entity_id(&self) -> Option<&EntityId> {
        self.entity_id.as_ref()
    }

    /// 1-based index of the active step.
    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Steps whose submissions have been acknowledged. Never shrinks.
    pub fn completed_steps(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn steps(&self) -> &[StepStore] {
        &self.steps
    }

    /// Read access to one step's store.
    pub fn step(&self, step: usize) -> Result<&StepStore, WizardError> {
        self.bounds_check(step)?;
        Ok(&self.steps[step - 1])
    }

    /// Mutable access to one step's store, for callers that edit outside the
    /// active step (review screens and the like).
    pub fn step_mut(&mut self, step: usize) -> Result<&mut StepStore, WizardError> {
        self.bounds_check(step)?;
        Ok(&mut self.steps[step - 1])
    }

    /// Per-step statuses in order, for completion indicators.
    pub fn step_statuses(&self) -> Vec<StepStatus> {
        self.steps.iter().map(StepStore::status).collect()
    }

    /// Writes a field on the active step and revalidates it, so statuses
    /// track every change.
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<(), WizardError> {
        let store = &mut self.steps[self.current - 1];
        store.set_value(path, value)?;
        store.validate();
        Ok(())
    }

    /// Moves the cursor backwards (or stays put). Never validates, never
    /// touches the network, and refuses to move forward.
    pub fn go_to_step(&mut self, step: usize) -> Result<(), WizardError> {
        self.bounds_check(step)?;
        if step > self.current {
            return Err(WizardError::ForwardJump {
                target: step,
                current: self.current,
            });
        }
        self.current = step;
        Ok(())
    }

    /// Forward navigation without persisting: every step before the target
    /// must validate. On the first invalid step the cursor lands there and
    /// its errors are returned. Backward targets fall through to plain
    /// navigation.
    pub fn request_jump_to(&mut self, target: usize) -> Result<(), WizardError> {
        self.bounds_check(target)?;
        if target <= self.current {
            return self.go_to_step(target);
        }
        for step in 1..target {
            let store = &mut self.steps[step - 1];
            if !store.validate() {
                self.current = step;
                tracing::debug!(
                    session = %self.session_id,
                    target,
                    blocked_on = step,
                    "jump blocked by an invalid step"
                );
                return Err(WizardError::Validation {
                    step,
                    errors: store.errors().clone(),
                });
            }
        }
        self.current = target;
        Ok(())
    }

    /// Validates the active step, persists it through the gateway, records
    /// completion, and moves the cursor forward. The whole call is atomic:
    /// any failure leaves cursor, completion set, and entity id untouched.
    pub fn advance_from_step(&mut self, step: usize) -> Result<StepAdvance, WizardError> {
        self.bounds_check(step)?;
        if step != self.current {
            return Err(WizardError::InactiveStep {
                step,
                current: self.current,
            });
        }

        let store = &mut self.steps[step - 1];
        if !store.validate() {
            tracing::debug!(
                session = %self.session_id,
                step,
                errors = store.errors().len(),
                "submit blocked by validation"
            );
            return Err(WizardError::Validation {
                step,
                errors: store.errors().clone(),
            });
        }

        if step > 1 && self.entity_id.is_none() {
            return Err(WizardError::MissingEntityId(format!("step {step}")));
        }

        let payload = store.values().clone();
        let ack = self
            .gateway
            .submit_step(step, self.entity_id.as_ref(), &payload)
            .map_err(|error| {
                tracing::warn!(session = %self.session_id, step, %error, "step submission failed");
                error
            })?;

        let entity_id = match self.entity_id.clone().or(ack.entity_id) {
            Some(id) => id,
            None => {
                return Err(WizardError::Remote(RemoteError::Decode(
                    "step acknowledgement did not include an entity id".to_string(),
                )))
            }
        };
        self.entity_id = Some(entity_id.clone());

        self.completed.insert(step);
        self.current = (step + 1).min(self.steps.len());
        tracing::info!(
            session = %self.session_id,
            entity = %entity_id,
            step,
            now_on = self.current,
            "step persisted"
        );

        Ok(StepAdvance {
            step,
            current_step: self.current,
            entity_id,
        })
    }

    pub(crate) fn steps_mut(&mut self) -> &mut [StepStore] {
        &mut self.steps
    }

    pub(crate) fn gateway(&self) -> &G {
        &self.gateway
    }

    pub(crate) fn session_id(&self) -> Uuid {
        self.session_id
    }

    fn bounds_check(&self, step: usize) -> Result<(), WizardError> {
        if (1..=self.steps.len()).contains(&step) {
            Ok(())
        } else {
            Err(WizardError::UnknownStep {
                step,
                count: self.steps.len(),
            })
        }
    }
}
