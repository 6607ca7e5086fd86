//! AI collaborators for valuation, investment matching and chat.
//!
//! The engine treats these as opaque one-shot calls. The provider family is
//! picked once at startup from configuration.

pub mod chat;
pub mod domain;
pub mod gemini;
pub mod mock;
pub mod router;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AdvisoryConfig, AdvisoryProviderKind};

pub use chat::ChatSession;
pub use domain::{
    ChatMessage, ChatSender, InvestmentGoal, InvestmentOpportunity, InvestmentProfile, Language,
    PriceRange, PropertyRating, RiskLevel, ValuationRequest, ValuationResponse,
};
pub use gemini::GeminiAdvisor;
pub use mock::MockAdvisor;
pub use router::{advisory_router, AdvisoryState};

#[async_trait]
pub trait ValuationProvider: Send + Sync {
    async fn valuation(
        &self,
        request: &ValuationRequest,
        language: Language,
    ) -> Result<ValuationResponse, AdvisoryError>;
}

#[async_trait]
pub trait MatchingProvider: Send + Sync {
    async fn matches(
        &self,
        profile: &InvestmentProfile,
        language: Language,
    ) -> Result<Vec<InvestmentOpportunity>, AdvisoryError>;
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Reply to `message` given the prior turns of the same session.
    async fn reply(
        &self,
        history: &[ChatMessage],
        message: &str,
        language: Language,
    ) -> Result<String, AdvisoryError>;
}

/// Failure talking to the AI collaborator.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    #[error("advisory provider request failed: {0}")]
    Transport(String),
    #[error("advisory provider returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("advisory provider returned no content")]
    EmptyResponse,
    #[error("advisory provider returned malformed content: {0}")]
    Malformed(String),
    #[error("advisory provider misconfigured: {0}")]
    Configuration(String),
    #[error("chat session unavailable")]
    SessionUnavailable,
}

impl AdvisoryError {
    /// Generic message shown to the end user; provider details stay in the logs.
    pub fn user_message(&self, language: Language) -> &'static str {
        match language {
            Language::En => {
                "I'm currently experiencing high traffic. Please try asking your question again in a moment."
            }
            Language::Ar => "أواجه حالياً ضغطاً كبيراً. يرجى محاولة طرح سؤالك مرة أخرى بعد قليل.",
        }
    }
}

/// The three collaborators, all backed by the same provider family.
#[derive(Clone)]
pub struct AdvisoryProviders {
    pub valuation: Arc<dyn ValuationProvider>,
    pub matching: Arc<dyn MatchingProvider>,
    pub chat: Arc<dyn ChatProvider>,
}

impl AdvisoryProviders {
    pub fn mock() -> Self {
        let advisor = Arc::new(MockAdvisor);
        Self {
            valuation: advisor.clone(),
            matching: advisor.clone(),
            chat: advisor,
        }
    }

    pub fn from_config(config: &AdvisoryConfig) -> Result<Self, AdvisoryError> {
        match config.provider {
            AdvisoryProviderKind::Mock => Ok(Self::mock()),
            AdvisoryProviderKind::Gemini => {
                let advisor = Arc::new(GeminiAdvisor::from_config(config)?);
                Ok(Self {
                    valuation: advisor.clone(),
                    matching: advisor.clone(),
                    chat: advisor,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests;
