//! HTTP surface for the platform webhook.
//!
//! One delivery moves through verify → parse → ack → dispatch. The 200
//! acknowledgment goes out as soon as the body is accepted; dispatch and
//! delivery failures are logged on the processing task, never surfaced
//! to the platform.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::dialogue::Dispatcher;
use crate::messenger::{MessageSender, ProfileLookup};
use crate::nlu::Classifier;
use crate::session::SessionRegistry;
use crate::webhook::event::{InboundEvent, WebhookPayload};
use crate::webhook::signature::{self, SIGNATURE_HEADER};

/// Everything one delivery needs, injected at startup.
#[derive(Clone)]
pub struct WebhookState {
    pub registry: Arc<SessionRegistry>,
    pub dispatcher: Arc<Dispatcher>,
    pub classifier: Arc<dyn Classifier>,
    pub sender: Arc<dyn MessageSender>,
    pub profiles: Arc<dyn ProfileLookup>,
    pub app_secret: SecretString,
    pub verify_token: String,
}

/// Build the webhook router.
pub fn webhook_routes(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", get(verify_subscription).post(receive_delivery))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionQuery {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// GET /webhook — subscription handshake. Echo the challenge iff the
/// mode is `subscribe` and the verify token matches.
async fn verify_subscription(
    State(state): State<WebhookState>,
    Query(query): Query<SubscriptionQuery>,
) -> impl IntoResponse {
    if query.mode.as_deref() == Some("subscribe")
        && query.verify_token.as_deref() == Some(state.verify_token.as_str())
    {
        (StatusCode::OK, query.challenge.unwrap_or_default())
    } else {
        warn!("webhook subscription handshake rejected");
        (StatusCode::BAD_REQUEST, String::new())
    }
}

/// POST /webhook — one delivery, possibly carrying multiple events.
async fn receive_delivery(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if let Err(err) = signature::verify(&body, header, state.app_secret.expose_secret()) {
        warn!(error = %err, "rejecting unauthenticated delivery");
        return StatusCode::UNAUTHORIZED;
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "rejecting malformed delivery body");
            return StatusCode::BAD_REQUEST;
        }
    };

    // Ack fast; the platform retries slow or non-200 responses.
    tokio::spawn(process_delivery(state, payload));
    StatusCode::OK
}

/// Work through one delivery's events sequentially. Failures are scoped
/// to their event and never stop siblings.
async fn process_delivery(state: WebhookState, payload: WebhookPayload) {
    if payload.object != "page" {
        debug!(object = %payload.object, "ignoring non-page delivery");
        return;
    }
    for entry in payload.entry {
        for raw in entry.messaging {
            let Some(event) = raw.into_inbound() else {
                continue;
            };
            handle_event(&state, event).await;
        }
    }
}

async fn handle_event(state: &WebhookState, event: InboundEvent) {
    let sender_id = event.sender_id().to_string();
    let session = state.registry.get_or_create(&sender_id).await;
    let mut session = session.lock().await;
    let actions = match state
        .dispatcher
        .dispatch(
            &event,
            &mut session,
            state.classifier.as_ref(),
            state.profiles.as_ref(),
        )
        .await
    {
        Ok(actions) => actions,
        Err(err) => {
            error!(user_id = %sender_id, error = %err, "dispatch failed");
            return;
        }
    };
    for action in actions {
        if let Err(err) = state.sender.send(&action.recipient_id, &action.message).await {
            error!(
                recipient_id = %action.recipient_id,
                error = %err,
                "failed to deliver reply"
            );
        }
    }
}
