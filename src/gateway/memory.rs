//! In-memory gateway used by tests and local demos.
//!
//! Behaves like a cooperative backend: mints ids, merges step payloads into
//! one document per entity, and can be scripted to fail its next call.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};
use uuid::Uuid;

use super::{EntityId, RemoteError, StepAck, SyncGateway};

/// What a recorded call was persisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Step(usize),
    Finalize,
}

/// One persisted call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub kind: SubmissionKind,
    pub entity_id: Option<EntityId>,
    pub payload: Map<String, Value>,
}

#[derive(Debug, Default)]
struct State {
    entities: HashMap<String, Map<String, Value>>,
    submissions: Vec<SubmissionRecord>,
    failures: VecDeque<RemoteError>,
}

/// Clones share one backend, so a test can keep a handle while the wizard
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<State>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-loads an entity exactly as the backend would return it, wire
    /// formats included.
    pub fn seed_entity(&self, id: EntityId, entity: Value) {
        let record = match entity {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        self.lock().entities.insert(id.as_str().to_string(), record);
    }

    /// Queues an error for the next gateway call, whatever it is. Queued
    /// errors are consumed in order, one per call.
    pub fn fail_next(&self, error: RemoteError) {
        self.lock().failures.push_back(error);
    }

    /// Every persisted call so far, in order.
    pub fn submissions(&self) -> Vec<SubmissionRecord> {
        self.lock().submissions.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.lock().submissions.len()
    }

    /// Current merged document for an entity, if any call created it.
    pub fn entity(&self, id: &EntityId) -> Option<Map<String, Value>> {
        self.lock().entities.get(id.as_str()).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_scripted_failure(&self) -> Option<RemoteError> {
        self.lock().failures.pop_front()
    }
}

impl SyncGateway for InMemoryGateway {
    fn submit_step(
        &self,
        step: usize,
        entity_id: Option<&EntityId>,
        payload: &Map<String, Value>,
    ) -> Result<StepAck, RemoteError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        let id = entity_id
            .cloned()
            .unwrap_or_else(|| EntityId::new(Uuid::new_v4().to_string()));

        let mut state = self.lock();
        let document = state.entities.entry(id.as_str().to_string()).or_default();
        for (key, value) in payload {
            document.insert(key.clone(), value.clone());
        }
        state.submissions.push(SubmissionRecord {
            kind: SubmissionKind::Step(step),
            entity_id: entity_id.cloned(),
            payload: payload.clone(),
        });

        Ok(StepAck {
            entity_id: Some(id),
            message: None,
        })
    }

    fn finalize(
        &self,
        entity_id: &EntityId,
        payload: &Map<String, Value>,
    ) -> Result<StepAck, RemoteError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        let mut state = self.lock();
        let document = state
            .entities
            .entry(entity_id.as_str().to_string())
            .or_default();
        for (key, value) in payload {
            document.insert(key.clone(), value.clone());
        }
        state.submissions.push(SubmissionRecord {
            kind: SubmissionKind::Finalize,
            entity_id: Some(entity_id.clone()),
            payload: payload.clone(),
        });

        Ok(StepAck {
            entity_id: Some(entity_id.clone()),
            message: None,
        })
    }

    fn fetch_entity(&self, entity_id: &EntityId) -> Result<Value, RemoteError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        match self.lock().entities.get(entity_id.as_str()) {
            Some(document) => Ok(Value::Object(document.clone())),
            None => Err(RemoteError::Api {
                status: Some(404),
                message: format!("event {entity_id} not found"),
            }),
        }
    }
}
