//! Contact identities
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use std::fmt;
use std::str::FromStr;

/// Numeric user id of a contact on the chat transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactId(pub u64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContactId {
    type Err = anyhow::Error;

    /// Parses a non-zero numeric id. Zero is the transport's "unset" value.
    fn from_str(s: &str) -> Result<Self> {
        let id = s
            .trim()
            .parse::<u64>()
            .map_err(|e| anyhow!("invalid contact id '{s}': {e}"))?;
        if id == 0 {
            return Err(anyhow!("contact id must be non-zero"));
        }
        Ok(ContactId(id))
    }
}
