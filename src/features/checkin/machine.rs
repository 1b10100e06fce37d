//! # Check-In State Machine
//!
//! Pure transition rules for the check-in cycle. Nothing here sends messages
//! or touches the clock; callers pass the current time in and execute the
//! returned steps.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Rules
//! - Prompt: no prompt outstanding and a full prompt interval has passed since
//!   the anchor
//! - Escalate: prompt outstanding, not yet escalated, and the escalation delay
//!   has passed since the prompt. The cycle re-anchors to the prompt time, not
//!   to the escalation time.
//! - Reply: a message from the primary contact clears the prompt and
//!   re-anchors the cycle to the reply

use chrono::{DateTime, Utc};
use log::debug;

use super::policy::{describe_duration, CheckInPolicy};
use super::state::CheckInState;
use crate::core::ContactId;
use crate::gateway::InboundReply;

/// The two parties of a check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contacts {
    pub primary: ContactId,
    pub secondary: ContactId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Prompt,
    Escalation,
    Acknowledgment,
}

impl ActionKind {
    /// Whether the step's state change only holds once the message was delivered
    pub fn requires_delivery(self) -> bool {
        matches!(self, ActionKind::Prompt | ActionKind::Escalation)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Prompt => "prompt",
            ActionKind::Escalation => "escalation",
            ActionKind::Acknowledgment => "acknowledgment",
        }
    }
}

/// An outbound message the scheduler must deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub recipient: ContactId,
    pub text: String,
}

/// One fired rule: the message to send and the state that holds afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub action: Action,
    pub next: CheckInState,
}

/// The next event the cycle is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextDue {
    Prompt(DateTime<Utc>),
    Escalation(DateTime<Utc>),
}

#[derive(Debug, Clone)]
pub struct CheckInMachine {
    contacts: Contacts,
    policy: CheckInPolicy,
}

impl CheckInMachine {
    pub fn new(contacts: Contacts, policy: CheckInPolicy) -> Self {
        Self { contacts, policy }
    }

    pub fn policy(&self) -> CheckInPolicy {
        self.policy
    }

    /// Periodic evaluation. Steps are ordered, and each step's `next` is the
    /// input to the following rule.
    pub fn on_tick(&self, state: &CheckInState, now: DateTime<Utc>) -> Vec<Step> {
        let mut steps = Vec::new();
        let mut current = state.clone();

        if let Some(step) = self.prompt_rule(&current, now) {
            current = step.next.clone();
            steps.push(step);
        }

        if let Some(step) = self.escalation_rule(&current, now) {
            steps.push(step);
        }

        steps
    }

    /// Reply handling. Messages from anyone but the primary contact are ignored.
    pub fn on_reply(&self, state: &CheckInState, reply: &InboundReply) -> Option<Step> {
        if reply.sender != self.contacts.primary {
            debug!("Ignoring message from non-primary contact {}", reply.sender);
            return None;
        }

        let mut next = state.clone();
        if next.awaiting_reply {
            next.awaiting_reply = false;
            next.escalated = false;
        }
        next.last_anchor_time = reply.received_at;

        Some(Step {
            action: Action {
                kind: ActionKind::Acknowledgment,
                recipient: self.contacts.primary,
                text: format!(
                    "Got it! I'll check back with you in {}.",
                    describe_duration(self.policy.prompt_interval)
                ),
            },
            next,
        })
    }

    /// Saturates at the latest representable time instead of overflowing
    pub fn next_due(&self, state: &CheckInState) -> NextDue {
        let after = |start: DateTime<Utc>, delay: chrono::Duration| {
            start
                .checked_add_signed(delay)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        };

        match (state.awaiting_reply, state.escalated, state.prompt_sent_time) {
            (true, false, Some(sent)) => {
                NextDue::Escalation(after(sent, self.policy.escalation_after))
            }
            _ => NextDue::Prompt(after(state.last_anchor_time, self.policy.prompt_interval)),
        }
    }

    fn prompt_rule(&self, state: &CheckInState, now: DateTime<Utc>) -> Option<Step> {
        if state.awaiting_reply || now - state.last_anchor_time < self.policy.prompt_interval {
            return None;
        }

        let next = CheckInState {
            awaiting_reply: true,
            prompt_sent_time: Some(now),
            escalated: false,
            ..state.clone()
        };

        Some(Step {
            action: Action {
                kind: ActionKind::Prompt,
                recipient: self.contacts.primary,
                text: format!(
                    "Hi! This is your check-in for the last {}. Please reply to let me know you're okay.",
                    describe_duration(self.policy.prompt_interval)
                ),
            },
            next,
        })
    }

    fn escalation_rule(&self, state: &CheckInState, now: DateTime<Utc>) -> Option<Step> {
        if !state.awaiting_reply || state.escalated {
            return None;
        }
        let sent = state.prompt_sent_time?;
        if now - sent < self.policy.escalation_after {
            return None;
        }

        let next = CheckInState {
            last_anchor_time: sent,
            awaiting_reply: false,
            prompt_sent_time: Some(sent),
            escalated: true,
        };

        Some(Step {
            action: Action {
                kind: ActionKind::Escalation,
                recipient: self.contacts.secondary,
                text: format!(
                    "Alert: primary contact (ID: {}) hasn't responded to the check-in message sent {} ago.",
                    self.contacts.primary,
                    describe_duration(self.policy.escalation_after)
                ),
            },
            next,
        })
    }
}
