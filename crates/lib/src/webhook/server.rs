//! Webhook HTTP server: verification handshake, delivery, health.

use crate::channels::WhatsAppChannel;
use crate::config::Config;
use crate::llm::OpenAiClient;
use crate::reply::{self, BusinessContext, ReplyAction};
use crate::store::{MessageRecord, SupabaseClient};
use crate::webhook::payload::{InboundMessage, WebhookEvent};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared state for the webhook server (config plus the three upstream clients).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: SupabaseClient,
    pub llm: OpenAiClient,
    pub channel: WhatsAppChannel,
}

impl AppState {
    /// Build the upstream clients from the configuration.
    pub fn new(config: Config) -> Self {
        let store = SupabaseClient::new(&config.supabase_url, &config.supabase_key);
        let llm = OpenAiClient::new(&config.openai_api_key, config.openai_base_url.clone());
        let channel = WhatsAppChannel::new(
            &config.whatsapp_token,
            &config.whatsapp_phone_id,
            config.graph_api_base.clone(),
        );
        Self {
            config: Arc::new(config),
            store,
            llm,
            channel,
        }
    }
}

/// Run the webhook server; binds to config.bind:config.port.
/// Blocks until shutdown (Ctrl+C or SIGTERM).
pub async fn run_server(config: Config) -> Result<()> {
    let state = AppState::new(config);
    let bind_addr = format!("{}:{}", state.config.bind, state.config.port);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("webhook server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server exited")?;
    log::info!("webhook server stopped");
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", get(verify).post(delivery))
        .with_state(state)
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// GET /health returns a simple status JSON (for probes).
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Subscription handshake: echo hub.challenge when hub.mode is present and the
/// token matches the configured secret. Stateless, no side effects.
fn verify_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    verify_token: &str,
) -> Option<String> {
    let mode = mode?;
    let token = token?;
    let challenge = challenge?;

    if !mode.is_empty() && token == verify_token {
        Some(challenge.to_string())
    } else {
        None
    }
}

/// GET /webhook — Meta's subscription verification request.
async fn verify(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let echoed = verify_subscription(
        params.get("hub.mode").map(String::as_str),
        params.get("hub.verify_token").map(String::as_str),
        params.get("hub.challenge").map(String::as_str),
        &state.config.verify_token,
    );
    match echoed {
        Some(challenge) => (StatusCode::OK, challenge).into_response(),
        None => {
            log::warn!("webhook verification rejected");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// POST /webhook — receives a delivery event; always 200 once processing ran
/// to completion, 500 only when the processing task died.
async fn delivery(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(_) => return StatusCode::BAD_REQUEST,
    };
    let handle = tokio::spawn(process_event(state, event));
    status_for_processing(handle.await)
}

/// 200 when the batch task ran to completion, 500 when it panicked.
fn status_for_processing(result: std::result::Result<(), tokio::task::JoinError>) -> StatusCode {
    match result {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            log::error!("webhook processing failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Process the first entry's first change. No messages is a valid no-op; the
/// platform expects a 200 either way.
async fn process_event(state: AppState, event: WebhookEvent) {
    let Some(change) = event
        .entry
        .into_iter()
        .next()
        .and_then(|e| e.changes.into_iter().next())
    else {
        return;
    };
    let phone_number_id = change
        .value
        .metadata
        .map(|m| m.phone_number_id)
        .unwrap_or_default();
    for msg in &change.value.messages {
        process_message(&state, &phone_number_id, msg).await;
    }
}

/// One message, start to finish: lookup → decide → resolve text → record →
/// send. Every step is awaited before the next; each upstream failure is
/// logged and swallowed so the remaining steps and messages still run.
async fn process_message(state: &AppState, phone_number_id: &str, msg: &InboundMessage) {
    let text = msg.text_body();
    log::info!("inbound message from {}", msg.from);

    let business = match state.store.fetch_business(phone_number_id).await {
        Ok(b) => b,
        Err(e) => {
            log::warn!("business lookup failed: {}", e);
            None
        }
    };
    let ctx = BusinessContext::from_business(business.as_ref());

    let reply_text = match reply::decide(text, &ctx) {
        ReplyAction::Templated(t) => t,
        ReplyAction::Generate(prompt) => state.llm.generate_reply(&prompt).await,
    };

    let record = MessageRecord::inbound(
        business.as_ref().and_then(|b| b.id),
        &msg.from,
        text,
        &reply_text,
    );
    if let Err(e) = state.store.insert_message(&record).await {
        log::warn!("message insert failed: {}", e);
    }

    if let Err(e) = state.channel.send_text(&msg.from, &reply_text).await {
        log::error!("whatsapp send failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_echoes_challenge_on_token_match() {
        let echoed = verify_subscription(
            Some("subscribe"),
            Some("my_token"),
            Some("challenge_123"),
            "my_token",
        );
        assert_eq!(echoed, Some("challenge_123".to_string()));
    }

    #[test]
    fn verification_rejects_wrong_token() {
        let echoed = verify_subscription(
            Some("subscribe"),
            Some("wrong_token"),
            Some("challenge_123"),
            "my_token",
        );
        assert_eq!(echoed, None);
    }

    #[test]
    fn verification_rejects_missing_params() {
        assert_eq!(
            verify_subscription(None, Some("my_token"), Some("c"), "my_token"),
            None
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("my_token"), None, "my_token"),
            None
        );
        assert_eq!(
            verify_subscription(Some(""), Some("my_token"), Some("c"), "my_token"),
            None
        );
    }

    #[tokio::test]
    async fn completed_processing_maps_to_ok() {
        let handle = tokio::spawn(async {});
        assert_eq!(status_for_processing(handle.await), StatusCode::OK);
    }

    #[tokio::test]
    async fn panicked_processing_maps_to_server_error() {
        let handle = tokio::spawn(async { panic!("boom") });
        assert_eq!(
            status_for_processing(handle.await),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
