//! # Check-In Feature
//!
//! Periodically prompts the primary contact and alerts the secondary contact
//! when a prompt goes unanswered.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod machine;
pub mod policy;
pub mod scheduler;
pub mod state;
pub mod store;

pub use machine::{Action, ActionKind, CheckInMachine, Contacts, NextDue, Step};
pub use policy::CheckInPolicy;
pub use scheduler::{CheckInScheduler, DEFAULT_CHECK_INTERVAL};
pub use state::{CheckInState, CyclePhase};
pub use store::StateStore;
