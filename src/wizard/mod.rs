//! The wizard state machine: per-step stores, the orchestrator that walks
//! them, and the final review aggregator.

pub mod orchestrator;
pub mod review;
pub mod store;

pub use orchestrator::{StepAdvance, Wizard, WizardMode};
pub use review::{ReviewAggregator, ReviewReport};
pub use store::{StepStatus, StepStore};
