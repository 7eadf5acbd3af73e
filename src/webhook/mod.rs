//! Inbound webhook surface: authentication, parsing, HTTP routes.

pub mod event;
pub mod routes;
pub mod signature;

pub use event::InboundEvent;
pub use routes::{WebhookState, webhook_routes};
