use super::handlers::{
    handle_answer, handle_health, handle_info, handle_join, handle_leave, handle_message,
    handle_pending, handle_receive,
};
use super::{AppState, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS};

use crate::chat::SessionRegistry;
use crate::config::Config;
use crate::responder;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
pub(super) fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Run the HTTP gateway on `host:port`.
pub async fn run_gateway(host: &str, port: u16, config: Arc<Config>) -> Result<()> {
    // ── Security: refuse public bind without explicit opt-in ──
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the gateway has no participant authentication.\n\
             Fix: use --host 127.0.0.1 (default), or set\n\
             [gateway] allow_public_bind = true in config.toml."
        );
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(host, listener, config).await
}

async fn build_registry(config: &Config) -> Result<SessionRegistry> {
    let generator =
        responder::create_responder(&config.responder).context("create reply generator")?;

    if let Err(e) = generator.warmup().await {
        tracing::warn!(
            generator = generator.name(),
            "Responder warmup failed (non-fatal): {e}"
        );
    }

    Ok(SessionRegistry::new(generator)
        .with_matching(config.matching.clone())
        .with_reply_timeout(Duration::from_secs(config.responder.timeout_secs)))
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
) -> Result<()> {
    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();
    let display_addr = format!("{host}:{actual_port}");

    let registry = Arc::new(build_registry(&config).await?);
    log_gateway_banner(&display_addr, &config);

    let state = AppState {
        config: Arc::clone(&config),
        registry,
    };
    let app = build_app(state, &config.gateway.cors_origins);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP gateway")?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

fn log_gateway_banner(display_addr: &str, config: &Config) {
    tracing::info!(
        addr = display_addr,
        provider = %config.responder.provider,
        model = config.responder.model.as_str(),
        human_prefix = config.matching.human_session_prefix.as_str(),
        "gateway listening"
    );
    tracing::debug!("routes: GET /health, POST /session/{{join,message,receive,answer,leave}}, GET /session/{{info,pending}}");
}

pub(super) fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/session/join", post(handle_join))
        .route("/session/message", post(handle_message))
        .route("/session/receive", post(handle_receive))
        .route("/session/answer", post(handle_answer))
        .route("/session/leave", post(handle_leave))
        .route("/session/info", get(handle_info))
        .route("/session/pending", get(handle_pending));

    let mut app = app
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ));

    if !cors_origins.is_empty() {
        let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );
    }

    app
}
