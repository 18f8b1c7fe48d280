//! Blocking HTTP implementation of the sync gateway.
//!
//! Endpoint layout, per step `n` of entity `id`:
//!
//! ```text
//! POST {base}/events/step1            first step, no id yet
//! PUT  {base}/events/{id}/step{n}     any step once the id exists
//! PUT  {base}/events/{id}/finalize    final save with the merged payload
//! GET  {base}/events/{id}             full entity fetch
//! ```
//!
//! Date-time values are rewritten to the backend's wire layout on the way
//! out; fetched entities come back untouched and are decoded by the caller.

use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{EntityId, GatewayConfig, RemoteError, StepAck, SyncGateway};
use crate::event;

pub struct HttpGateway {
    client: Client,
    config: GatewayConfig,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, RemoteError> {
        Self::new(GatewayConfig::from_env())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn execute(&self, request: RequestBuilder) -> Result<StepAck, RemoteError> {
        let response = self.authorize(request).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        interpret_response(status, &body)
    }
}

impl SyncGateway for HttpGateway {
    fn submit_step(
        &self,
        step: usize,
        entity_id: Option<&EntityId>,
        payload: &Map<String, Value>,
    ) -> Result<StepAck, RemoteError> {
        let body = event::wire::to_wire_payload(event::steps(), payload);
        let url = self.endpoint(&step_path(step, entity_id));
        tracing::debug!(%url, step, "submitting step payload");
        let request = match entity_id {
            Some(_) => self.client.put(&url),
            None => self.client.post(&url),
        };
        self.execute(request.json(&body))
    }

    fn finalize(
        &self,
        entity_id: &EntityId,
        payload: &Map<String, Value>,
    ) -> Result<StepAck, RemoteError> {
        let body = event::wire::to_wire_payload(event::steps(), payload);
        let url = self.endpoint(&format!("events/{entity_id}/finalize"));
        tracing::debug!(%url, "finalizing entity");
        self.execute(self.client.put(&url).json(&body))
    }

    fn fetch_entity(&self, entity_id: &EntityId) -> Result<Value, RemoteError> {
        let url = self.endpoint(&format!("events/{entity_id}"));
        tracing::debug!(%url, "fetching entity");
        let response = self.authorize(self.client.get(&url)).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        if !(200..300).contains(&status) {
            return Err(error_from_body(status, &body));
        }
        let value: Value =
            serde_json::from_str(&body).map_err(|err| RemoteError::Decode(err.to_string()))?;
        Ok(unwrap_envelope(value))
    }
}

/// Relative path for a step submission. The id is absent only before the
/// first step has been persisted.
fn step_path(step: usize, entity_id: Option<&EntityId>) -> String {
    match entity_id {
        Some(id) => format!("events/{id}/step{step}"),
        None => format!("events/step{step}"),
    }
}

/// Maps a raw HTTP response to an acknowledgement. Non-2xx statuses and
/// `success: false` envelopes are both API rejections.
pub fn interpret_response(status: u16, body: &str) -> Result<StepAck, RemoteError> {
    let envelope: Option<ApiEnvelope> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = envelope
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| format!("server returned status {status}"));
        return Err(RemoteError::Api {
            status: Some(status),
            message,
        });
    }

    let Some(envelope) = envelope else {
        if body.trim().is_empty() {
            return Ok(StepAck {
                entity_id: None,
                message: None,
            });
        }
        return Err(RemoteError::Decode(format!(
            "unrecognized response body: {}",
            truncate(body, 120)
        )));
    };

    if envelope.success == Some(false) {
        return Err(RemoteError::Api {
            status: Some(status),
            message: envelope
                .message
                .unwrap_or_else(|| "request was rejected".to_string()),
        });
    }

    let entity_id = envelope.data.as_ref().and_then(extract_entity_id);
    Ok(StepAck {
        entity_id,
        message: envelope.message,
    })
}

fn error_from_body(status: u16, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ApiEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .unwrap_or_else(|| format!("server returned status {status}"));
    RemoteError::Api {
        status: Some(status),
        message,
    }
}

/// Accepts either `{ "success": true, "data": {...} }` or a bare entity.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// The ack's `data` is either the entity (look for `id`) or the id itself.
fn extract_entity_id(data: &Value) -> Option<EntityId> {
    match data {
        Value::String(raw) => Some(EntityId::new(raw.clone())),
        Value::Object(map) => map.get("id").and_then(Value::as_str).map(EntityId::new),
        _ => None,
    }
}

fn truncate(body: &str, limit: usize) -> &str {
    match body.char_indices().nth(limit) {
        Some((offset, _)) => &body[..offset],
        None => body,
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}
