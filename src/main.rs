use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use chloe::config::AppConfig;
use chloe::dialogue::Dispatcher;
use chloe::messenger::GraphClient;
use chloe::nlu::{Classifier, DisabledClassifier, WitClassifier};
use chloe::session::SessionRegistry;
use chloe::webhook::{WebhookState, webhook_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    let classifier: Arc<dyn Classifier> = match &config.wit_token {
        Some(token) => Arc::new(WitClassifier::new(token.clone(), config.request_timeout)),
        None => {
            warn!("WIT_TOKEN not set; classification disabled, routing on exact text only");
            Arc::new(DisabledClassifier)
        }
    };

    let graph = Arc::new(GraphClient::new(
        config.page_token.clone(),
        config.request_timeout,
    ));

    let state = WebhookState {
        registry: Arc::new(SessionRegistry::new()),
        dispatcher: Arc::new(Dispatcher::new(config.routing_mode)),
        classifier,
        sender: graph.clone(),
        profiles: graph,
        app_secret: config.app_secret.clone(),
        verify_token: config.verify_token.clone(),
    };

    let app = webhook_routes(state).layer(TraceLayer::new_for_http());

    info!(
        verify_token = %config.verify_token,
        "/webhook will accept this verify token"
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        port = config.port,
        routing_mode = ?config.routing_mode,
        "listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
