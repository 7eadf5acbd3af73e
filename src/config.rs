//! Process configuration from environment variables.

use std::time::Duration;

use rand::RngCore;
use secrecy::SecretString;

use crate::dialogue::RoutingMode;
use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration, read once at startup.
#[derive(Clone)]
pub struct AppConfig {
    /// Port the webhook server binds.
    pub port: u16,
    /// Messenger page access token, used for sends and profile lookups.
    pub page_token: SecretString,
    /// App secret used to verify webhook signatures.
    pub app_secret: SecretString,
    /// Wit.ai token; classification is disabled when absent.
    pub wit_token: Option<SecretString>,
    /// Verify token for the subscription handshake, generated per
    /// process start and logged for the operator.
    pub verify_token: String,
    pub routing_mode: RoutingMode,
    /// Timeout applied to classifier, send, and profile calls.
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Read configuration from the environment. Missing mandatory
    /// secrets are fatal; the process must not start without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let page_token = required_secret("FB_PAGE_TOKEN")?;
        let app_secret = required_secret("FB_APP_SECRET")?;
        let wit_token = optional("WIT_TOKEN").map(SecretString::from);

        let port = match optional("PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("{raw:?} is not a port number"),
            })?,
        };

        let routing_mode = match optional("CHLOE_ROUTING_MODE").as_deref() {
            None | Some("compat") => RoutingMode::Compat,
            Some("state-gated") | Some("state_gated") => RoutingMode::StateGated,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "CHLOE_ROUTING_MODE".into(),
                    message: format!("{other:?} is not one of compat, state-gated"),
                });
            }
        };

        let request_timeout = match optional("CHLOE_REQUEST_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "CHLOE_REQUEST_TIMEOUT_SECS".into(),
                    message: format!("{raw:?} is not a number of seconds"),
                })?;
                Duration::from_secs(secs)
            }
        };

        Ok(Self {
            port,
            page_token,
            app_secret,
            wit_token,
            verify_token: generate_verify_token(),
            routing_mode,
            request_timeout,
        })
    }
}

fn required_secret(key: &str) -> Result<SecretString, ConfigError> {
    optional(key)
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Random token the operator registers with the platform; a new one per
/// process start.
pub fn generate_verify_token() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
