use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::gemini::extract_text;
use super::*;
use crate::config::{AdvisoryConfig, AdvisoryProviderKind};

fn villa_request() -> ValuationRequest {
    ValuationRequest {
        city: "Riyadh".to_string(),
        district: "Al Malqa".to_string(),
        area: 400.0,
        property_type: "Villa".to_string(),
        bedrooms: 5,
        age: 2,
        street_width: Some("20m".to_string()),
        direction: Some("North".to_string()),
        finishing: None,
    }
}

fn growth_profile() -> InvestmentProfile {
    InvestmentProfile {
        budget: 2_000_000.0,
        cities: vec!["Riyadh".to_string(), "Jeddah".to_string()],
        goal: InvestmentGoal::CapitalAppreciation,
        risk_tolerance: RiskLevel::Medium,
        property_types: vec!["Residential".to_string()],
    }
}

fn advisory_config(provider: AdvisoryProviderKind, api_key: Option<&str>) -> AdvisoryConfig {
    AdvisoryConfig {
        provider,
        api_key: api_key.map(str::to_string),
        model: "gemini-2.5-flash".to_string(),
        timeout: Duration::from_secs(5),
    }
}

/// Chat provider that remembers the history length it was handed.
#[derive(Default)]
struct RecordingChat {
    seen_history: Mutex<Vec<usize>>,
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn reply(
        &self,
        history: &[ChatMessage],
        message: &str,
        language: Language,
    ) -> Result<String, AdvisoryError> {
        self.seen_history.lock().unwrap().push(history.len());
        Ok(format!("{}:{message}", language.prompt_name()))
    }
}

struct FailingAdvisor;

#[async_trait]
impl ValuationProvider for FailingAdvisor {
    async fn valuation(
        &self,
        _request: &ValuationRequest,
        _language: Language,
    ) -> Result<ValuationResponse, AdvisoryError> {
        Err(AdvisoryError::Upstream {
            status: 503,
            body: "overloaded".to_string(),
        })
    }
}

#[async_trait]
impl MatchingProvider for FailingAdvisor {
    async fn matches(
        &self,
        _profile: &InvestmentProfile,
        _language: Language,
    ) -> Result<Vec<InvestmentOpportunity>, AdvisoryError> {
        Err(AdvisoryError::EmptyResponse)
    }
}

#[async_trait]
impl ChatProvider for FailingAdvisor {
    async fn reply(
        &self,
        _history: &[ChatMessage],
        _message: &str,
        _language: Language,
    ) -> Result<String, AdvisoryError> {
        Err(AdvisoryError::Transport("connection reset".to_string()))
    }
}

fn failing_providers() -> AdvisoryProviders {
    let advisor = Arc::new(FailingAdvisor);
    AdvisoryProviders {
        valuation: advisor.clone(),
        matching: advisor.clone(),
        chat: advisor,
    }
}

async fn post_json(state: Arc<AdvisoryState>, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = advisory_router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn mock_valuation_scales_with_area() {
    let valuation = MockAdvisor
        .valuation(&villa_request(), Language::En)
        .await
        .unwrap();

    assert_eq!(valuation.estimated_price.min, 1_800_000.0);
    assert_eq!(valuation.estimated_price.max, 2_080_000.0);
    assert_eq!(valuation.estimated_price.confidence, 85.0);
    assert_eq!(valuation.risk_level, RiskLevel::Low);
    assert_eq!(valuation.comparables.len(), 2);
    assert!(valuation.comparables[0].contains("1,920,000 SAR"));
    assert!(valuation.market_analysis.contains("Al Malqa, Riyadh"));
}

#[tokio::test]
async fn mock_valuation_answers_in_arabic() {
    let valuation = MockAdvisor
        .valuation(&villa_request(), Language::Ar)
        .await
        .unwrap();

    assert!(valuation.market_analysis.starts_with("بناءً"));
    assert!(valuation.comparables[1].ends_with("ر.س"));
}

#[tokio::test]
async fn mock_matches_stay_within_budget() {
    let profile = growth_profile();
    let matches = MockAdvisor.matches(&profile, Language::En).await.unwrap();

    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|item| item.price <= profile.budget));
    assert_eq!(matches[0].price, 1_600_000.0);
    assert_eq!(matches[0].expected_roi, 15.5);
    assert_eq!(matches[1].match_score, 88.0);
}

#[tokio::test]
async fn chat_session_resets_when_language_changes() {
    let provider = Arc::new(RecordingChat::default());
    let session = ChatSession::new(provider.clone());
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();

    let first = session.send("hello", Language::En, now).await.unwrap();
    assert_eq!(first.text, "English:hello");
    assert_eq!(first.sender, ChatSender::Ai);
    session.send("prices?", Language::En, now).await.unwrap();
    assert_eq!(session.history().unwrap().len(), 4);

    session.send("مرحبا", Language::Ar, now).await.unwrap();
    assert_eq!(session.language().unwrap(), Some(Language::Ar));
    assert_eq!(session.history().unwrap().len(), 2);
    assert_eq!(*provider.seen_history.lock().unwrap(), vec![0, 2, 0]);
}

#[tokio::test]
async fn failed_chat_turn_is_not_recorded() {
    let session = ChatSession::new(Arc::new(FailingAdvisor));
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();

    let err = session.send("hello", Language::En, now).await.unwrap_err();
    assert!(matches!(err, AdvisoryError::Transport(_)));
    assert!(session.history().unwrap().is_empty());
}

#[test]
fn providers_follow_configuration() {
    assert!(AdvisoryProviders::from_config(&advisory_config(AdvisoryProviderKind::Mock, None)).is_ok());
    assert!(AdvisoryProviders::from_config(&advisory_config(
        AdvisoryProviderKind::Gemini,
        Some("test-key")
    ))
    .is_ok());

    let err = AdvisoryProviders::from_config(&advisory_config(AdvisoryProviderKind::Gemini, None))
        .err()
        .expect("missing key should be rejected");
    assert!(matches!(err, AdvisoryError::Configuration(_)));
}

#[test]
fn extract_text_joins_first_candidate_parts() {
    let payload = json!({
        "candidates": [
            { "content": { "role": "model", "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } },
            { "content": { "parts": [{ "text": "ignored" }] } }
        ]
    });
    assert_eq!(extract_text(&payload).as_deref(), Some("{\"a\":1}"));

    assert_eq!(extract_text(&json!({ "candidates": [] })), None);
    assert_eq!(
        extract_text(&json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] })),
        None
    );
}

#[test]
fn user_message_is_localized() {
    let err = AdvisoryError::EmptyResponse;
    assert!(err.user_message(Language::En).contains("high traffic"));
    assert!(err.user_message(Language::Ar).contains("ضغطاً"));
}

#[tokio::test]
async fn valuation_route_returns_camel_case_payload() {
    let state = Arc::new(AdvisoryState::new(AdvisoryProviders::mock()));
    let (status, body) = post_json(
        state,
        "/api/v1/advisory/valuation",
        json!({
            "language": "en",
            "request": {
                "city": "Riyadh",
                "district": "Al Malqa",
                "area": 400.0,
                "type": "Villa",
                "bedrooms": 5,
                "age": 2
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pricePerMeter"], 4850.0);
    assert_eq!(body["riskLevel"], "Low");
    assert_eq!(body["propertyRating"]["price"], 92.0);
}

#[tokio::test]
async fn provider_failure_maps_to_bad_gateway_with_localized_message() {
    let state = Arc::new(AdvisoryState::new(failing_providers()));

    let (status, body) = post_json(
        state.clone(),
        "/api/v1/advisory/chat",
        json!({ "language": "ar", "message": "كم سعر المتر؟" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["error"],
        AdvisoryError::EmptyResponse.user_message(Language::Ar)
    );

    let (status, body) = post_json(
        state,
        "/api/v1/advisory/matches",
        json!({
            "profile": {
                "budget": 1500000.0,
                "cities": ["Jeddah"],
                "goal": "Rental Income",
                "riskTolerance": "Low",
                "propertyTypes": ["Commercial"]
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("high traffic"));
}

#[tokio::test]
async fn empty_chat_message_is_rejected() {
    let state = Arc::new(AdvisoryState::new(AdvisoryProviders::mock()));
    let (status, _) = post_json(
        state,
        "/api/v1/advisory/chat",
        json!({ "message": "   " }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
