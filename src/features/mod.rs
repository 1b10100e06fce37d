//! # Features Layer
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod checkin;

pub use checkin::{CheckInMachine, CheckInPolicy, CheckInScheduler, CheckInState, StateStore};
