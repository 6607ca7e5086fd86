use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::chat::ChatSession;
use super::domain::{InvestmentProfile, Language, ValuationRequest};
use super::{AdvisoryError, AdvisoryProviders};

/// Providers plus the process-wide chat session.
pub struct AdvisoryState {
    providers: AdvisoryProviders,
    chat: ChatSession,
}

impl AdvisoryState {
    pub fn new(providers: AdvisoryProviders) -> Self {
        let chat = ChatSession::new(providers.chat.clone());
        Self { providers, chat }
    }

    pub fn providers(&self) -> &AdvisoryProviders {
        &self.providers
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValuationBody {
    #[serde(default)]
    pub(crate) language: Language,
    pub(crate) request: ValuationRequest,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchesBody {
    #[serde(default)]
    pub(crate) language: Language,
    pub(crate) profile: InvestmentProfile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatBody {
    #[serde(default)]
    pub(crate) language: Language,
    pub(crate) message: String,
}

pub fn advisory_router(state: Arc<AdvisoryState>) -> Router {
    Router::new()
        .route("/api/v1/advisory/valuation", post(valuation_handler))
        .route("/api/v1/advisory/matches", post(matches_handler))
        .route("/api/v1/advisory/chat", post(chat_handler))
        .with_state(state)
}

async fn valuation_handler(
    State(state): State<Arc<AdvisoryState>>,
    axum::Json(body): axum::Json<ValuationBody>,
) -> Response {
    match state
        .providers
        .valuation
        .valuation(&body.request, body.language)
        .await
    {
        Ok(valuation) => (StatusCode::OK, axum::Json(valuation)).into_response(),
        Err(err) => error_response(err, body.language),
    }
}

async fn matches_handler(
    State(state): State<Arc<AdvisoryState>>,
    axum::Json(body): axum::Json<MatchesBody>,
) -> Response {
    match state
        .providers
        .matching
        .matches(&body.profile, body.language)
        .await
    {
        Ok(opportunities) => (StatusCode::OK, axum::Json(opportunities)).into_response(),
        Err(err) => error_response(err, body.language),
    }
}

async fn chat_handler(
    State(state): State<Arc<AdvisoryState>>,
    axum::Json(body): axum::Json<ChatBody>,
) -> Response {
    if body.message.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({ "error": "message must not be empty" })),
        )
            .into_response();
    }

    match state.chat.send(&body.message, body.language, Utc::now()).await {
        Ok(reply) => (StatusCode::OK, axum::Json(reply)).into_response(),
        Err(err) => error_response(err, body.language),
    }
}

fn error_response(err: AdvisoryError, language: Language) -> Response {
    warn!(error = %err, "advisory request failed");
    (
        StatusCode::BAD_GATEWAY,
        axum::Json(json!({ "error": err.user_message(language) })),
    )
        .into_response()
}
