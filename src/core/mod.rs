//! # Core Module
//!
//! Shared identity types and environment configuration.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod config;
pub mod contact;

// Re-export commonly used items
pub use config::Config;
pub use contact::ContactId;
