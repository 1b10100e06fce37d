//! # Message Gateway
//!
//! Outbound delivery and inbound replies for the check-in loop. The loop only
//! sees the [`MessageGateway`] trait and an mpsc stream of [`InboundReply`];
//! the Discord implementation lives in [`discord`].
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod discord;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::ContactId;

pub use discord::{DiscordGateway, ReplyForwarder};

/// Capacity of the reply channel between the transport and the scheduler
pub const REPLY_CHANNEL_CAPACITY: usize = 64;

/// A direct message received from some contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundReply {
    pub sender: ContactId,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

/// Sends a text message to a single contact
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send(&self, recipient: ContactId, text: &str) -> Result<()>;
}
