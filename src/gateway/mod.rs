//! Remote persistence boundary for wizard steps.
//!
//! The orchestrator only ever talks to [`SyncGateway`]; the HTTP
//! implementation maps steps onto the backend's per-step endpoints and the
//! in-memory one backs tests and local demos.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod http;
pub mod memory;

pub use http::HttpGateway;
pub use memory::{InMemoryGateway, SubmissionKind, SubmissionRecord};

/// Backend-assigned identifier for the entity under construction. Opaque on
/// this side; it only travels back into URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Acknowledgement returned by the backend for a persisted call.
#[derive(Debug, Clone, PartialEq)]
pub struct StepAck {
    /// Identifier minted (or echoed) by the backend. The first step's ack
    /// must carry one; later acks may repeat it.
    pub entity_id: Option<EntityId>,
    pub message: Option<String>,
}

/// Failures crossing the remote boundary.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Connection, TLS, or timeout trouble before any response arrived.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered and said no.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },
    /// The backend answered with a body this client cannot make sense of.
    #[error("invalid response payload: {0}")]
    Decode(String),
}

/// Interface the orchestrator persists through.
///
/// `step` is the 1-based step index. `entity_id` is `None` only for the very
/// first persisted step; every later call must carry the id minted by it.
pub trait SyncGateway {
    fn submit_step(
        &self,
        step: usize,
        entity_id: Option<&EntityId>,
        payload: &Map<String, Value>,
    ) -> Result<StepAck, RemoteError>;

    /// Marks the entity complete with the merged payload of every step.
    fn finalize(&self, entity_id: &EntityId, payload: &Map<String, Value>)
        -> Result<StepAck, RemoteError>;

    /// Fetches the full entity as the backend stores it (wire formats).
    fn fetch_entity(&self, entity_id: &EntityId) -> Result<Value, RemoteError>;
}

/// Connection settings for the HTTP gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api".to_string(),
            bearer_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    /// Reads `EVENT_WIZARD_API_URL` and `EVENT_WIZARD_API_TOKEN`, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var("EVENT_WIZARD_API_URL") {
            if !base_url.trim().is_empty() {
                config.base_url = base_url;
            }
        }
        if let Ok(token) = std::env::var("EVENT_WIZARD_API_TOKEN") {
            if !token.trim().is_empty() {
                config.bearer_token = Some(token);
            }
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}
