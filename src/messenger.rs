//! Outbound delivery through the Messenger Send API.
//!
//! `MessageSender` and `ProfileLookup` are the seams the webhook handler
//! and dispatcher depend on; `GraphClient` implements both against the
//! Graph API. Failures are typed — a 2xx body carrying `error.message`
//! is a platform rejection, not a success.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;

/// Messenger caps quick replies per message.
pub const QUICK_REPLY_LIMIT: usize = 13;

/// A platform-rendered button attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReply {
    /// Visible button label. Routing keys on this, not the payload.
    pub title: String,
    pub payload: String,
}

impl QuickReply {
    pub fn new(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
        }
    }
}

/// One outbound message: text plus an ordered set of quick replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
}

impl OutboundMessage {
    /// Plain text message without quick replies.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    /// Message with quick replies. Replies beyond the platform cap are
    /// dropped rather than sent to the wire.
    pub fn with_quick_replies(
        text: impl Into<String>,
        replies: impl IntoIterator<Item = QuickReply>,
    ) -> Self {
        let mut quick_replies: Vec<QuickReply> = replies.into_iter().collect();
        if quick_replies.len() > QUICK_REPLY_LIMIT {
            tracing::warn!(
                count = quick_replies.len(),
                limit = QUICK_REPLY_LIMIT,
                "truncating quick replies to the platform cap"
            );
            quick_replies.truncate(QUICK_REPLY_LIMIT);
        }
        Self {
            text: text.into(),
            quick_replies,
        }
    }
}

/// A message addressed to one recipient.
#[derive(Debug, Clone)]
pub struct OutboundAction {
    pub recipient_id: String,
    pub message: OutboundMessage,
}

/// Public profile fields the greeting flow uses.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub first_name: String,
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, recipient_id: &str, message: &OutboundMessage)
    -> Result<(), DeliveryError>;
}

#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn profile(&self, user_id: &str) -> Result<UserProfile, DeliveryError>;
}

const GRAPH_API_URL: &str = "https://graph.facebook.com";

/// Graph API client for the Send API and profile lookups.
pub struct GraphClient {
    page_token: SecretString,
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl GraphClient {
    pub fn new(page_token: SecretString, timeout: Duration) -> Self {
        Self {
            page_token,
            client: reqwest::Client::new(),
            base_url: GRAPH_API_URL.to_string(),
            timeout,
        }
    }

    /// Point the client at a different Graph endpoint (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Decode a Graph response, surfacing `error.message` bodies as
    /// platform rejections regardless of HTTP status.
    async fn decode(response: reqwest::Response) -> Result<serde_json::Value, DeliveryError> {
        let status = response.status();
        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|err| DeliveryError::InvalidResponse {
                    reason: err.to_string(),
                })?;
        if let Some(message) = body.pointer("/error/message").and_then(|m| m.as_str()) {
            return Err(DeliveryError::PlatformRejected {
                message: message.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DeliveryError::RequestFailed {
                reason: format!("status {status}"),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl MessageSender for GraphClient {
    async fn send(
        &self,
        recipient_id: &str,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError> {
        let body = SendRequest {
            recipient: Recipient { id: recipient_id },
            messaging_type: "RESPONSE",
            message: WireMessage {
                text: &message.text,
                quick_replies: message
                    .quick_replies
                    .iter()
                    .map(|reply| WireQuickReply {
                        content_type: "text",
                        title: &reply.title,
                        payload: &reply.payload,
                    })
                    .collect(),
            },
        };
        let response = self
            .client
            .post(format!("{}/me/messages", self.base_url))
            .query(&[("access_token", self.page_token.expose_secret())])
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_request_error)?;
        Self::decode(response).await?;
        tracing::debug!(recipient_id = %recipient_id, "message delivered");
        Ok(())
    }
}

#[async_trait]
impl ProfileLookup for GraphClient {
    async fn profile(&self, user_id: &str) -> Result<UserProfile, DeliveryError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, user_id))
            .query(&[
                ("fields", "first_name"),
                ("access_token", self.page_token.expose_secret()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_request_error)?;
        let body = Self::decode(response).await?;
        serde_json::from_value(body).map_err(|err| DeliveryError::InvalidResponse {
            reason: err.to_string(),
        })
    }
}

fn map_request_error(err: reqwest::Error) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Timeout
    } else {
        DeliveryError::RequestFailed {
            reason: err.to_string(),
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    recipient: Recipient<'a>,
    messaging_type: &'static str,
    message: WireMessage<'a>,
}

#[derive(Serialize)]
struct Recipient<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    quick_replies: Vec<WireQuickReply<'a>>,
}

#[derive(Serialize)]
struct WireQuickReply<'a> {
    content_type: &'static str,
    title: &'a str,
    payload: &'a str,
}
