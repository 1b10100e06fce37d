//! # Check-In Scheduler
//!
//! Owns the check-in state and serializes ticks and inbound replies onto a
//! single consumer. After every event the emitted messages are delivered and
//! the state is saved.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::machine::{CheckInMachine, NextDue, Step};
use super::state::CheckInState;
use super::store::StateStore;
use crate::gateway::{InboundReply, MessageGateway};

/// Default time between periodic evaluations
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

pub struct CheckInScheduler<G: MessageGateway> {
    machine: CheckInMachine,
    store: StateStore,
    gateway: Arc<G>,
    state: CheckInState,
    check_interval: Duration,
}

impl<G: MessageGateway> CheckInScheduler<G> {
    pub fn new(
        machine: CheckInMachine,
        store: StateStore,
        gateway: Arc<G>,
        state: CheckInState,
        check_interval: Duration,
    ) -> Self {
        Self {
            machine,
            store,
            gateway,
            state,
            check_interval,
        }
    }

    pub fn state(&self) -> &CheckInState {
        &self.state
    }

    /// Run until the process exits
    pub async fn run(mut self, mut replies: mpsc::Receiver<InboundReply>) {
        info!(
            "⏰ Check-in scheduler started (checking every {}s, {})",
            self.check_interval.as_secs(),
            self.describe_next_due()
        );

        let mut ticker = tokio::time::interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut replies_open = true;

        loop {
            tokio::select! {
                reply = replies.recv(), if replies_open => match reply {
                    Some(reply) => self.handle_reply(reply).await,
                    None => {
                        warn!("Reply stream closed; continuing with scheduled checks only");
                        replies_open = false;
                    }
                },
                _ = ticker.tick() => self.handle_tick(Utc::now()).await,
            }
        }
    }

    /// Periodic evaluation at `now`
    pub async fn handle_tick(&mut self, now: DateTime<Utc>) {
        let steps = self.machine.on_tick(&self.state, now);
        self.apply(steps).await;
        self.persist().await;
    }

    /// Process one inbound message
    pub async fn handle_reply(&mut self, reply: InboundReply) {
        if let Some(step) = self.machine.on_reply(&self.state, &reply) {
            info!("💬 Reply from primary contact: {}", reply.text);
            self.apply(vec![step]).await;
        }
        self.persist().await;
    }

    /// Deliver steps in order. A failed prompt or escalation withholds its
    /// state change and every later step, so the next tick retries it.
    async fn apply(&mut self, steps: Vec<Step>) {
        for step in steps {
            let kind = step.action.kind;
            match self
                .gateway
                .send(step.action.recipient, &step.action.text)
                .await
            {
                Ok(()) => {
                    info!("📨 Sent {} to {}", kind.as_str(), step.action.recipient);
                }
                Err(e) => {
                    error!(
                        "Failed to send {} to {}: {e}",
                        kind.as_str(),
                        step.action.recipient
                    );
                    if kind.requires_delivery() {
                        break;
                    }
                }
            }
            self.state = step.next;
            debug!("Cycle is now {:?}; {}", self.state.phase(), self.describe_next_due());
        }
    }

    async fn persist(&self) {
        if let Err(e) = self.store.save(&self.state).await {
            error!("Failed to save check-in state: {e:#}");
        }
    }

    fn describe_next_due(&self) -> String {
        match self.machine.next_due(&self.state) {
            NextDue::Prompt(at) => format!("next prompt due {}", at.format("%Y-%m-%d %H:%M UTC")),
            NextDue::Escalation(at) => {
                format!("escalation due {}", at.format("%Y-%m-%d %H:%M UTC"))
            }
        }
    }
}

/// Wait on the transport and the scheduler task together. Both are meant to
/// run for the life of the process, so either one finishing is an error and
/// the process should exit for its supervisor to restart it.
pub async fn supervise<F, E>(transport: F, scheduler: JoinHandle<()>) -> Result<()>
where
    F: Future<Output = std::result::Result<(), E>>,
    E: Display,
{
    tokio::select! {
        result = transport => {
            let reason = match result {
                Ok(()) => "transport shut down".to_string(),
                Err(e) => format!("transport failed: {e}"),
            };
            error!("Gateway stopped: {reason}");
            Err(anyhow!("gateway stopped: {reason}"))
        }
        result = scheduler => {
            let reason = match result {
                Ok(()) => "scheduler exited".to_string(),
                Err(e) => format!("scheduler task failed: {e}"),
            };
            error!("Check-in scheduler stopped: {reason}");
            Err(anyhow!("check-in scheduler stopped: {reason}"))
        }
    }
}
