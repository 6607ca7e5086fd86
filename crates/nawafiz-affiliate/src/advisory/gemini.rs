use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::domain::{
    ChatMessage, ChatSender, InvestmentOpportunity, InvestmentProfile, Language,
    ValuationRequest, ValuationResponse,
};
use super::{AdvisoryError, ChatProvider, MatchingProvider, ValuationProvider};
use crate::config::AdvisoryConfig;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const VALUATION_TEMPERATURE: f64 = 0.4;
const MATCHING_TEMPERATURE: f64 = 0.7;

/// Advisor backed by the Gemini `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct GeminiAdvisor {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiAdvisor {
    pub fn from_config(config: &AdvisoryConfig) -> Result<Self, AdvisoryError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AdvisoryError::Configuration("GEMINI_API_KEY is not set".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| AdvisoryError::Configuration(err.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/{}:generateContent", self.model)
    }

    async fn generate(&self, body: Value) -> Result<String, AdvisoryError> {
        debug!(model = %self.model, "calling advisory provider");
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| AdvisoryError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| AdvisoryError::Malformed(err.to_string()))?;
        extract_text(&payload).ok_or(AdvisoryError::EmptyResponse)
    }

    async fn generate_json<T>(
        &self,
        prompt: String,
        schema: Value,
        temperature: f64,
    ) -> Result<T, AdvisoryError>
    where
        T: DeserializeOwned,
    {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
                "temperature": temperature,
            },
        });
        let text = self.generate(body).await?;
        serde_json::from_str(&text).map_err(|err| AdvisoryError::Malformed(err.to_string()))
    }
}

/// Concatenated text parts of the first candidate, if any.
pub fn extract_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn valuation_prompt(request: &ValuationRequest, language: Language) -> String {
    format!(
        "Act as a certified expert real estate appraiser in Saudi Arabia.\n\
         Perform a detailed valuation for the following property:\n\
         - City: {city}\n\
         - District: {district}\n\
         - Area: {area} sqm\n\
         - Type: {kind}\n\
         - Bedrooms: {bedrooms}\n\
         - Property Age: {age} years\n\
         - Street Width: {street}\n\
         - Facade Direction: {direction}\n\
         - Finishing Quality: {finishing}\n\n\
         Consider:\n\
         1. The specific value impact of the street width and facade direction (e.g., North facing is often preferred).\n\
         2. Current Saudi market trends (Vision 2030, major infrastructure projects like Metro, Qiddiya, etc.).\n\
         3. Comparables in the specific district.\n\n\
         Provide a realistic valuation range in SAR.\n\n\
         IMPORTANT: Respond in the following language: {language}.",
        city = request.city,
        district = request.district,
        area = request.area,
        kind = request.property_type,
        bedrooms = request.bedrooms,
        age = request.age,
        street = request.street_width.as_deref().unwrap_or("Standard"),
        direction = request.direction.as_deref().unwrap_or("Unspecified"),
        finishing = request.finishing.as_deref().unwrap_or("Standard"),
        language = language.prompt_name(),
    )
}

fn matching_prompt(profile: &InvestmentProfile, language: Language) -> String {
    format!(
        "Act as a real estate investment advisor for the Saudi Arabia market.\n\
         Generate 3 specific, realistic investment opportunities based on this investor profile:\n\
         - Budget: {budget} SAR\n\
         - Preferred Cities: {cities}\n\
         - Strategy: {goal}\n\
         - Risk Tolerance: {risk:?}\n\
         - Property Types: {types}\n\n\
         The opportunities should be representative of actual market conditions in Saudi Arabia (Riyadh, Jeddah, Dammam, etc.).\n\
         Ensure the price is within or close to the budget.\n\
         Generate a unique ID for each.\n\n\
         IMPORTANT: Respond in the following language: {language}.",
        budget = profile.budget,
        cities = profile.cities.join(", "),
        goal = profile.goal.label(),
        risk = profile.risk_tolerance,
        types = profile.property_types.join(", "),
        language = language.prompt_name(),
    )
}

fn chat_instruction(language: Language) -> String {
    format!(
        "You are Nawafiz AI, an intelligent real estate consultant for the Saudi Arabian market.\n\
         Assist investors and home buyers.\n\
         Answer questions about property prices, market trends (Riyadh, Jeddah, Dammam), investment strategies, and Saudi Vision 2030's impact.\n\
         Always use Saudi Riyals (SAR).\n\n\
         CRITICAL: You must ALWAYS reply in the following language: {}.",
        language.prompt_name()
    )
}

fn valuation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "estimatedPrice": {
                "type": "OBJECT",
                "properties": {
                    "min": { "type": "NUMBER", "description": "Minimum estimated price in SAR" },
                    "max": { "type": "NUMBER", "description": "Maximum estimated price in SAR" },
                    "confidence": { "type": "NUMBER", "description": "Confidence score from 0 to 100" }
                },
                "required": ["min", "max", "confidence"]
            },
            "pricePerMeter": { "type": "NUMBER", "description": "Average price per square meter in SAR" },
            "marketAnalysis": { "type": "STRING", "description": "A comprehensive 3-4 sentence analysis of the market conditions, neighborhood trends, and valuation rationale." },
            "riskLevel": { "type": "STRING", "enum": ["Low", "Medium", "High"] },
            "comparables": { "type": "ARRAY", "items": { "type": "STRING" }, "description": "List of 3 comparable recent sales or listings." },
            "locationScore": { "type": "NUMBER", "description": "Score from 0 to 10 based on proximity to amenities, roads, and future projects." },
            "futureGrowth": { "type": "NUMBER", "description": "Projected percentage growth in value over the next 12 months." },
            "propertyRating": {
                "type": "OBJECT",
                "description": "Scores from 0 to 100 for specific aspects",
                "properties": {
                    "location": { "type": "NUMBER" },
                    "services": { "type": "NUMBER" },
                    "price": { "type": "NUMBER" },
                    "future": { "type": "NUMBER" }
                },
                "required": ["location", "services", "price", "future"]
            }
        },
        "required": [
            "estimatedPrice", "pricePerMeter", "marketAnalysis", "riskLevel",
            "comparables", "locationScore", "futureGrowth", "propertyRating"
        ]
    })
}

fn matching_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "title": { "type": "STRING" },
                "location": { "type": "STRING" },
                "type": { "type": "STRING" },
                "price": { "type": "NUMBER" },
                "expectedROI": { "type": "NUMBER", "description": "Expected annual ROI percentage" },
                "matchScore": { "type": "NUMBER", "description": "Match score 0-100" },
                "reason": { "type": "STRING", "description": "Why this matches the user profile" },
                "riskFactors": { "type": "ARRAY", "items": { "type": "STRING" } }
            },
            "required": [
                "id", "title", "location", "type", "price",
                "expectedROI", "matchScore", "reason", "riskFactors"
            ]
        }
    })
}

fn chat_contents(history: &[ChatMessage], message: &str) -> Vec<Value> {
    history
        .iter()
        .map(|turn| {
            let role = match turn.sender {
                ChatSender::User => "user",
                ChatSender::Ai => "model",
            };
            json!({ "role": role, "parts": [{ "text": turn.text }] })
        })
        .chain(std::iter::once(
            json!({ "role": "user", "parts": [{ "text": message }] }),
        ))
        .collect()
}

#[async_trait]
impl ValuationProvider for GeminiAdvisor {
    async fn valuation(
        &self,
        request: &ValuationRequest,
        language: Language,
    ) -> Result<ValuationResponse, AdvisoryError> {
        self.generate_json(
            valuation_prompt(request, language),
            valuation_schema(),
            VALUATION_TEMPERATURE,
        )
        .await
        .inspect_err(|err| warn!(error = %err, "valuation request failed"))
    }
}

#[async_trait]
impl MatchingProvider for GeminiAdvisor {
    async fn matches(
        &self,
        profile: &InvestmentProfile,
        language: Language,
    ) -> Result<Vec<InvestmentOpportunity>, AdvisoryError> {
        self.generate_json(
            matching_prompt(profile, language),
            matching_schema(),
            MATCHING_TEMPERATURE,
        )
        .await
        .inspect_err(|err| warn!(error = %err, "investment matching failed"))
    }
}

#[async_trait]
impl ChatProvider for GeminiAdvisor {
    async fn reply(
        &self,
        history: &[ChatMessage],
        message: &str,
        language: Language,
    ) -> Result<String, AdvisoryError> {
        let body = json!({
            "systemInstruction": { "parts": [{ "text": chat_instruction(language) }] },
            "contents": chat_contents(history, message),
        });
        self.generate(body)
            .await
            .inspect_err(|err| warn!(error = %err, "chat reply failed"))
    }
}
