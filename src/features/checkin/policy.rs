//! Check-in timing policy
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{bail, Result};
use chrono::Duration;

/// Hours between the start of a cycle and the next prompt
pub const DEFAULT_PROMPT_INTERVAL_HOURS: i64 = 72;

/// Hours an unanswered prompt waits before the secondary contact is alerted
pub const DEFAULT_ESCALATION_AFTER_HOURS: i64 = 48;

/// Upper bound for either threshold (ten years), keeping all date arithmetic in range
pub const MAX_INTERVAL_HOURS: u32 = 10 * 365 * 24;

/// Thresholds driving the prompt and escalation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInPolicy {
    pub prompt_interval: Duration,
    pub escalation_after: Duration,
}

impl Default for CheckInPolicy {
    fn default() -> Self {
        Self {
            prompt_interval: Duration::hours(DEFAULT_PROMPT_INTERVAL_HOURS),
            escalation_after: Duration::hours(DEFAULT_ESCALATION_AFTER_HOURS),
        }
    }
}

impl CheckInPolicy {
    /// Build a policy from whole hours, rejecting zero or oversized thresholds
    pub fn from_hours(prompt_interval_hours: u32, escalation_after_hours: u32) -> Result<Self> {
        if prompt_interval_hours == 0 {
            bail!("prompt interval must be at least one hour");
        }
        if escalation_after_hours == 0 {
            bail!("escalation delay must be at least one hour");
        }
        if prompt_interval_hours > MAX_INTERVAL_HOURS {
            bail!("prompt interval must be at most {MAX_INTERVAL_HOURS} hours");
        }
        if escalation_after_hours > MAX_INTERVAL_HOURS {
            bail!("escalation delay must be at most {MAX_INTERVAL_HOURS} hours");
        }
        Ok(Self {
            prompt_interval: Duration::hours(i64::from(prompt_interval_hours)),
            escalation_after: Duration::hours(i64::from(escalation_after_hours)),
        })
    }
}

/// Render a duration for user-facing messages ("3 days", "1 day 6 hours", "48 minutes")
pub fn describe_duration(duration: Duration) -> String {
    fn plural(n: i64) -> &'static str {
        if n == 1 {
            ""
        } else {
            "s"
        }
    }

    let minutes = duration.num_minutes();
    if minutes < 60 {
        return format!("{} minute{}", minutes, plural(minutes));
    }

    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{} hour{}", hours, plural(hours));
    }

    let days = hours / 24;
    let rem = hours % 24;
    if rem > 0 {
        format!("{} day{} {} hour{}", days, plural(days), rem, plural(rem))
    } else {
        format!("{} day{}", days, plural(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_thresholds() {
        let policy = CheckInPolicy::default();
        assert_eq!(policy.prompt_interval, Duration::hours(72));
        assert_eq!(policy.escalation_after, Duration::hours(48));
    }

    #[test]
    fn test_from_hours_rejects_zero() {
        assert!(CheckInPolicy::from_hours(0, 48).is_err());
        assert!(CheckInPolicy::from_hours(72, 0).is_err());

        let policy = CheckInPolicy::from_hours(24, 12).unwrap();
        assert_eq!(policy.prompt_interval, Duration::hours(24));
        assert_eq!(policy.escalation_after, Duration::hours(12));
    }

    #[test]
    fn test_from_hours_rejects_more_than_ten_years() {
        assert!(CheckInPolicy::from_hours(MAX_INTERVAL_HOURS, MAX_INTERVAL_HOURS).is_ok());
        assert!(CheckInPolicy::from_hours(MAX_INTERVAL_HOURS + 1, 48).is_err());
        assert!(CheckInPolicy::from_hours(72, u32::MAX).is_err());
    }

    #[test]
    fn test_describe_duration() {
        assert_eq!(describe_duration(Duration::hours(72)), "3 days");
        assert_eq!(describe_duration(Duration::hours(24)), "1 day");
        assert_eq!(describe_duration(Duration::hours(30)), "1 day 6 hours");
        assert_eq!(describe_duration(Duration::hours(12)), "12 hours");
        assert_eq!(describe_duration(Duration::hours(1)), "1 hour");
        assert_eq!(describe_duration(Duration::minutes(5)), "5 minutes");
    }
}
