//! Persisted check-in cycle state
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Progress of the current check-in cycle
///
/// Legacy keys written by earlier deployments are accepted as aliases so an
/// existing state file survives an upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInState {
    /// Start of the current cycle; the next prompt is due one prompt interval later
    #[serde(alias = "last_message_time")]
    pub last_anchor_time: DateTime<Utc>,

    /// A prompt is outstanding and no reply has arrived yet
    #[serde(alias = "waiting_for_reply")]
    pub awaiting_reply: bool,

    /// When the outstanding prompt was sent
    #[serde(default, alias = "message_sent_time")]
    pub prompt_sent_time: Option<DateTime<Utc>>,

    /// The secondary contact has been alerted for the current prompt
    #[serde(alias = "notification_sent")]
    pub escalated: bool,
}

/// Where the cycle currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    AwaitingReply,
    Escalated,
}

impl CheckInState {
    /// Fresh state whose anchor lies `prompt_interval` in the past, so the
    /// first tick sends a prompt immediately
    pub fn fresh(now: DateTime<Utc>, prompt_interval: Duration) -> Self {
        Self {
            last_anchor_time: now
                .checked_sub_signed(prompt_interval)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            awaiting_reply: false,
            prompt_sent_time: None,
            escalated: false,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        match (self.awaiting_reply, self.escalated) {
            (true, false) => CyclePhase::AwaitingReply,
            (true, true) => CyclePhase::Escalated,
            (false, _) => CyclePhase::Idle,
        }
    }

    /// Clear a prompt that has no send time recorded; nothing could ever
    /// escalate or re-prompt from that shape. Returns true when repaired.
    pub fn repair(&mut self) -> bool {
        if self.awaiting_reply && self.prompt_sent_time.is_none() {
            self.awaiting_reply = false;
            self.escalated = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_state_is_due_immediately() {
        let state = CheckInState::fresh(t0(), Duration::hours(72));
        assert_eq!(state.last_anchor_time, t0() - Duration::hours(72));
        assert!(!state.awaiting_reply);
        assert!(!state.escalated);
        assert_eq!(state.prompt_sent_time, None);
        assert_eq!(state.phase(), CyclePhase::Idle);
    }

    #[test]
    fn test_fresh_state_with_oversized_interval_saturates() {
        let state = CheckInState::fresh(t0(), Duration::hours(i64::from(u32::MAX)));
        assert_eq!(state.last_anchor_time, DateTime::<Utc>::MIN_UTC);
        assert!(!state.awaiting_reply);
    }

    #[test]
    fn test_serialized_keys_are_stable() {
        let state = CheckInState {
            last_anchor_time: t0(),
            awaiting_reply: true,
            prompt_sent_time: Some(t0()),
            escalated: false,
        };
        let json = serde_json::to_value(&state).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("last_anchor_time"));
        assert!(obj.contains_key("awaiting_reply"));
        assert!(obj.contains_key("prompt_sent_time"));
        assert!(obj.contains_key("escalated"));
        assert_eq!(obj.len(), 4);
    }

    #[test]
    fn test_legacy_keys_are_accepted() {
        let json = r#"{
            "last_message_time": "2024-03-01T09:00:00Z",
            "waiting_for_reply": true,
            "message_sent_time": "2024-03-01T09:00:00Z",
            "notification_sent": false
        }"#;
        let state: CheckInState = serde_json::from_str(json).unwrap();
        assert_eq!(state.last_anchor_time, t0());
        assert!(state.awaiting_reply);
        assert_eq!(state.prompt_sent_time, Some(t0()));
        assert_eq!(state.phase(), CyclePhase::AwaitingReply);
    }

    #[test]
    fn test_repair_clears_prompt_without_send_time() {
        let mut state = CheckInState {
            last_anchor_time: t0(),
            awaiting_reply: true,
            prompt_sent_time: None,
            escalated: true,
        };
        assert!(state.repair());
        assert_eq!(state.phase(), CyclePhase::Idle);
        assert!(!state.escalated);

        let mut healthy = CheckInState::fresh(t0(), Duration::hours(72));
        assert!(!healthy.repair());
    }
}
