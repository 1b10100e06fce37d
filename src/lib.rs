// Core layer - shared types and configuration
pub mod core;

// Features layer - check-in state machine, scheduler and persistence
pub mod features;

// Transport layer - outbound delivery and inbound replies
pub mod gateway;

// Re-export core config for convenience
pub use crate::core::Config;

pub use features::{CheckInMachine, CheckInPolicy, CheckInScheduler, CheckInState, StateStore};
pub use gateway::{InboundReply, MessageGateway};
