//! Discord direct-message transport
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::UserId;
use serenity::prelude::*;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::{InboundReply, MessageGateway};
use crate::core::ContactId;

/// Sends check-in messages as Discord DMs
#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessageGateway for DiscordGateway {
    async fn send(&self, recipient: ContactId, text: &str) -> Result<()> {
        let http: &Http = &self.http;
        let dm = UserId(recipient.0)
            .create_dm_channel(http)
            .await
            .map_err(|e| anyhow!("failed to open DM with {recipient}: {e}"))?;

        dm.send_message(http, |m| m.content(text))
            .await
            .map_err(|e| anyhow!("failed to send DM to {recipient}: {e}"))?;

        debug!("Delivered DM to {recipient}");
        Ok(())
    }
}

/// Serenity event handler that forwards direct messages to the scheduler
pub struct ReplyForwarder {
    replies: mpsc::Sender<InboundReply>,
}

impl ReplyForwarder {
    pub fn new(replies: mpsc::Sender<InboundReply>) -> Self {
        Self { replies }
    }

    fn to_reply(msg: &Message) -> InboundReply {
        let received_at = chrono::DateTime::from_timestamp(msg.timestamp.unix_timestamp(), 0)
            .unwrap_or_else(chrono::Utc::now);

        InboundReply {
            sender: ContactId(msg.author.id.0),
            text: msg.content.clone(),
            received_at,
        }
    }
}

#[async_trait]
impl EventHandler for ReplyForwarder {
    async fn message(&self, _ctx: Context, msg: Message) {
        // Guild traffic is never a check-in reply
        if msg.author.bot || msg.guild_id.is_some() {
            return;
        }

        if self.replies.send(Self::to_reply(&msg)).await.is_err() {
            warn!("Scheduler stopped, dropping DM from {}", msg.author.id);
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("🤖 Bot ID: {}", ready.user.id);
    }
}
