//! Wellness coach - guided support chat service
//!
//! A Rust backend implementing a per-user session state machine around a
//! hosted chat-completion model, with crisis keyword detection and a
//! free-chat/credit ledger.

mod api;
mod config;
mod conversation;
mod credits;
mod crisis;
mod llm;
mod runtime;
mod state_machine;
mod system_prompt;

use api::{create_router, AppState};
use config::{AppConfig, CredentialSource, EnvCredential};
use llm::{ChatClient, LoggingClient, OpenRouterClient};
use runtime::{SessionDefaults, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wellness_coach=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let (config, problems) = AppConfig::from_env();
    for problem in &problems {
        tracing::warn!(error = %problem, "Ignoring invalid configuration value");
    }

    // Chat client
    let credentials: Arc<dyn CredentialSource> =
        Arc::new(EnvCredential::new(config.api_key_var.clone()));
    let openrouter = OpenRouterClient::new(&config.api_url, &config.model, credentials.clone())?;
    let client: Arc<dyn ChatClient> = Arc::new(LoggingClient::new(Arc::new(openrouter)));

    if client.has_credential() {
        tracing::info!(
            model = %config.model,
            url = %config.api_url,
            "Chat client initialized"
        );
    } else {
        tracing::warn!(
            var = %credentials.describe(),
            "No API key configured. Chat stays disabled until it is set."
        );
    }

    // Sessions
    let sessions = Arc::new(SessionManager::new(
        client,
        SessionDefaults {
            top_up_delay: config.top_up_delay,
            starting_credits: config.starting_credits,
        },
    ));

    // Idle session sweeper
    let sweeper = sessions.clone();
    let idle_timeout = config.session_idle_timeout;
    let sweep_every = idle_timeout.clamp(Duration::from_secs(1), Duration::from_secs(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        loop {
            ticker.tick().await;
            sweeper.cleanup_expired(idle_timeout).await;
        }
    });

    let state = AppState::new(sessions);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Wellness coach server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
