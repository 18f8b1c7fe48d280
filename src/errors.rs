use std::collections::BTreeMap;

use thiserror::Error;

use crate::gateway::RemoteError;

/// Error type that captures every way a wizard interaction can fail.
#[derive(Debug, Error)]
pub enum WizardError {
    /// A step payload broke one or more field rules. Messages are keyed by
    /// field path and already phrased for display.
    #[error("step {step} failed validation")]
    Validation {
        step: usize,
        errors: BTreeMap<String, String>,
    },
    /// Final save refused because at least one step is still invalid.
    #[error("cannot save while {} step(s) have validation errors", .errors_by_step.len())]
    ReviewRejected {
        errors_by_step: BTreeMap<usize, Vec<String>>,
    },
    /// A persisting call needed the backend-assigned id before step 1 had
    /// produced one. The payload names the blocked action.
    #[error("no entity identifier yet: {0} requires a persisted first step")]
    MissingEntityId(String),
    /// Step index outside `1..=count`.
    #[error("unknown step {step}: this wizard has {count} steps")]
    UnknownStep { step: usize, count: usize },
    /// Submission attempted for a step that is not the active one.
    #[error("step {step} is not the active step (currently on step {current})")]
    InactiveStep { step: usize, current: usize },
    /// Direct forward navigation; forward movement must revalidate through
    /// a jump request.
    #[error("cannot move directly forward to step {target} from step {current}")]
    ForwardJump { target: usize, current: usize },
    /// Write addressed to a field the step schema does not declare.
    #[error("unknown field `{path}`{}", suggestion_suffix(.suggestion))]
    UnknownField {
        path: String,
        suggestion: Option<String>,
    },
    /// Field path string outside the supported grammar.
    #[error("invalid field path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean `{name}`?)"),
        None => String::new(),
    }
}
