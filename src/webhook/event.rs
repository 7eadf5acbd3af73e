//! Messenger webhook payload parsing.
//!
//! One delivery carries `{object, entry: [{messaging: [event…]}]}`.
//! Raw events are normalized into the [`InboundEvent`] sum type before
//! they reach the dispatcher; echoes and shapes we do not handle are
//! dropped during conversion.

use serde::Deserialize;

/// One inbound webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

/// Raw messaging event as the platform sends it.
#[derive(Debug, Deserialize)]
pub struct MessagingEvent {
    pub sender: Sender,
    #[serde(default)]
    pub message: Option<MessagePayload>,
    #[serde(default)]
    pub postback: Option<PostbackPayload>,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub is_echo: bool,
}

#[derive(Debug, Deserialize)]
pub struct PostbackPayload {
    pub payload: String,
}

/// A normalized inbound event, tagged by the sender's platform id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Text { sender_id: String, text: String },
    Attachment { sender_id: String },
    Postback { sender_id: String, payload: String },
}

impl InboundEvent {
    pub fn sender_id(&self) -> &str {
        match self {
            Self::Text { sender_id, .. }
            | Self::Attachment { sender_id }
            | Self::Postback { sender_id, .. } => sender_id,
        }
    }
}

impl MessagingEvent {
    /// Normalize one raw event. Echo messages, empty messages, and
    /// event kinds we do not handle come back as `None`. A message
    /// carrying both attachments and text counts as an attachment.
    pub fn into_inbound(self) -> Option<InboundEvent> {
        let sender_id = self.sender.id;
        if let Some(message) = self.message {
            if message.is_echo {
                tracing::debug!(sender_id = %sender_id, "dropping echo message");
                return None;
            }
            if message.attachments.is_some() {
                return Some(InboundEvent::Attachment { sender_id });
            }
            if let Some(text) = message.text {
                return Some(InboundEvent::Text { sender_id, text });
            }
            tracing::debug!(sender_id = %sender_id, "dropping message without text or attachments");
            return None;
        }
        if let Some(postback) = self.postback {
            return Some(InboundEvent::Postback {
                sender_id,
                payload: postback.payload,
            });
        }
        tracing::debug!(sender_id = %sender_id, "dropping unhandled event kind");
        None
    }
}
