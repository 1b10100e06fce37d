//! Environment configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use super::contact::ContactId;
use crate::features::checkin::policy::{
    CheckInPolicy, DEFAULT_ESCALATION_AFTER_HOURS, DEFAULT_PROMPT_INTERVAL_HOURS,
};
use crate::features::checkin::scheduler::DEFAULT_CHECK_INTERVAL;

const DEFAULT_STATE_FILE: &str = "bot_state.json";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Ticks further apart than this would delay prompts and escalations by hours
const MAX_CHECK_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub primary_contact: ContactId,
    pub secondary_contact: ContactId,
    pub state_file: PathBuf,
    pub log_level: String,
    pub check_interval: Duration,
    pub policy: CheckInPolicy,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN")
            .ok_or_else(|| anyhow!("DISCORD_TOKEN environment variable is required"))?;

        let primary_contact = Self::contact(&get, "PRIMARY_USER_ID")?;
        let secondary_contact = Self::contact(&get, "SECONDARY_USER_ID")?;

        let check_interval_secs: u64 = Self::number(&get, "CHECK_INTERVAL_SECS")?
            .unwrap_or(DEFAULT_CHECK_INTERVAL.as_secs());
        if check_interval_secs == 0 || check_interval_secs > MAX_CHECK_INTERVAL_SECS {
            return Err(anyhow!(
                "CHECK_INTERVAL_SECS must be between 1 and {MAX_CHECK_INTERVAL_SECS}"
            ));
        }

        let prompt_hours: u32 = Self::number(&get, "PROMPT_INTERVAL_HOURS")?
            .unwrap_or(DEFAULT_PROMPT_INTERVAL_HOURS as u32);
        let escalation_hours: u32 = Self::number(&get, "ESCALATION_AFTER_HOURS")?
            .unwrap_or(DEFAULT_ESCALATION_AFTER_HOURS as u32);
        let policy = CheckInPolicy::from_hours(prompt_hours, escalation_hours)?;

        Ok(Config {
            discord_token,
            primary_contact,
            secondary_contact,
            state_file: get("STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            check_interval: Duration::from_secs(check_interval_secs),
            policy,
        })
    }

    fn contact(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<ContactId> {
        get(key)
            .ok_or_else(|| anyhow!("{key} environment variable is required"))?
            .parse::<ContactId>()
            .with_context(|| format!("{key} is invalid"))
    }

    fn number<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        get(key)
            .map(|v| v.trim().parse::<T>())
            .transpose()
            .with_context(|| format!("{key} must be a positive whole number"))
    }
}
