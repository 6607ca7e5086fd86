use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response language requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub const fn is_arabic(self) -> bool {
        matches!(self, Language::Ar)
    }

    pub const fn prompt_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "Arabic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRequest {
    pub city: String,
    pub district: String,
    /// Built-up area in square meters.
    pub area: f64,
    #[serde(rename = "type")]
    pub property_type: String,
    pub bedrooms: u8,
    pub age: u16,
    #[serde(default)]
    pub street_width: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub finishing: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRating {
    pub location: f64,
    pub services: f64,
    pub price: f64,
    pub future: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResponse {
    pub estimated_price: PriceRange,
    pub price_per_meter: f64,
    pub market_analysis: String,
    pub risk_level: RiskLevel,
    pub comparables: Vec<String>,
    /// 0 to 10.
    pub location_score: f64,
    /// Projected 12 month growth, in percent.
    pub future_growth: f64,
    pub property_rating: PropertyRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentGoal {
    #[serde(rename = "Capital Appreciation")]
    CapitalAppreciation,
    #[serde(rename = "Rental Income")]
    RentalIncome,
    Balanced,
}

impl InvestmentGoal {
    pub const fn label(self) -> &'static str {
        match self {
            InvestmentGoal::CapitalAppreciation => "Capital Appreciation",
            InvestmentGoal::RentalIncome => "Rental Income",
            InvestmentGoal::Balanced => "Balanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentProfile {
    pub budget: f64,
    pub cities: Vec<String>,
    pub goal: InvestmentGoal,
    pub risk_tolerance: RiskLevel,
    pub property_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentOpportunity {
    pub id: String,
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub price: f64,
    #[serde(rename = "expectedROI")]
    pub expected_roi: f64,
    pub match_score: f64,
    pub reason: String,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: ChatSender,
    pub timestamp: DateTime<Utc>,
}
