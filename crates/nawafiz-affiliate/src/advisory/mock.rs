use async_trait::async_trait;

use super::domain::{
    ChatMessage, InvestmentOpportunity, InvestmentProfile, Language, PriceRange, PropertyRating,
    RiskLevel, ValuationRequest, ValuationResponse,
};
use super::{AdvisoryError, ChatProvider, MatchingProvider, ValuationProvider};

/// Deterministic stand-in used when no AI provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockAdvisor;

fn sar(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[async_trait]
impl ValuationProvider for MockAdvisor {
    async fn valuation(
        &self,
        request: &ValuationRequest,
        language: Language,
    ) -> Result<ValuationResponse, AdvisoryError> {
        let (market_analysis, comparables) = if language.is_arabic() {
            (
                format!(
                    "بناءً على الاتجاهات الحالية في {}، {}، يتزايد الطلب على العقارات من نوع {}. من المتوقع أن تعزز مشاريع البنية التحتية القريبة القيمة بنسبة 12% خلال العام المقبل.",
                    request.district, request.city, request.property_type
                ),
                vec![
                    format!(
                        "عقار مشابه من نوع {} في الملقا بيع بسعر {} ر.س",
                        request.property_type,
                        sar(request.area * 4800.0)
                    ),
                    format!("عرض جديد في مربع قريب بسعر {} ر.س", sar(request.area * 5100.0)),
                ],
            )
        } else {
            (
                format!(
                    "Based on current trends in {}, {}, the demand for {} properties is rising. Infrastructure projects nearby are expected to boost value by 12% over the next year.",
                    request.district, request.city, request.property_type
                ),
                vec![
                    format!(
                        "Similar {} in Al Malqa sold for {} SAR",
                        request.property_type,
                        sar(request.area * 4800.0)
                    ),
                    format!("New listing in nearby block at {} SAR", sar(request.area * 5100.0)),
                ],
            )
        };

        Ok(ValuationResponse {
            estimated_price: PriceRange {
                min: request.area * 4500.0,
                max: request.area * 5200.0,
                confidence: 85.0,
            },
            price_per_meter: 4850.0,
            market_analysis,
            risk_level: RiskLevel::Low,
            comparables,
            location_score: 8.5,
            future_growth: 12.4,
            property_rating: PropertyRating {
                location: 85.0,
                services: 78.0,
                price: 92.0,
                future: 88.0,
            },
        })
    }
}

#[async_trait]
impl MatchingProvider for MockAdvisor {
    async fn matches(
        &self,
        profile: &InvestmentProfile,
        language: Language,
    ) -> Result<Vec<InvestmentOpportunity>, AdvisoryError> {
        let ar = language.is_arabic();
        let text = |en: &str, ar_text: &str| if ar { ar_text.to_string() } else { en.to_string() };

        Ok(vec![
            InvestmentOpportunity {
                id: "1".to_string(),
                title: text("Off-plan Luxury Apartment", "شقة فاخرة تحت الإنشاء"),
                location: text("Al Narjis, Riyadh", "النرجس، الرياض"),
                property_type: text("Residential", "سكني"),
                price: profile.budget * 0.8,
                expected_roi: 15.5,
                match_score: 94.0,
                reason: text(
                    "Matches your high appreciation goal. Located near upcoming metro station.",
                    "يطابق هدفك في زيادة رأس المال. يقع بالقرب من محطة مترو قادمة.",
                ),
                risk_factors: vec![
                    text("Construction delay risk", "مخاطر تأخير البناء"),
                    text("Market saturation in North Riyadh", "تشبع السوق في شمال الرياض"),
                ],
            },
            InvestmentOpportunity {
                id: "2".to_string(),
                title: text("Commercial Strip Mall Unit", "وحدة تجارية في مجمع"),
                location: text("King Abdulaziz Rd, Jeddah", "طريق الملك عبدالعزيز، جدة"),
                property_type: text("Commercial", "تجاري"),
                price: profile.budget * 0.95,
                expected_roi: 8.2,
                match_score: 88.0,
                reason: text(
                    "Excellent rental income potential aligned with your preferences.",
                    "إمكانات تأجير ممتازة تتماشى مع تفضيلاتك.",
                ),
                risk_factors: vec![
                    text("Tenant turnover", "دوران المستأجرين"),
                    text("Maintenance costs", "تكاليف الصيانة"),
                ],
            },
        ])
    }
}

#[async_trait]
impl ChatProvider for MockAdvisor {
    async fn reply(
        &self,
        _history: &[ChatMessage],
        message: &str,
        language: Language,
    ) -> Result<String, AdvisoryError> {
        Ok(match language {
            Language::Ar => format!(
                "أنا أعمل في الوضع التجريبي (بدون مفتاح API). في سيناريو حقيقي، سأقوم بتحليل السوق السعودي للإجابة على: \"{message}\". يمكنني مساعدتك في تقييم العقارات، واتجاهات السوق في الرياض، أو العثور على فرص استثمارية."
            ),
            Language::En => format!(
                "I am running in demo mode (no API Key). In a real scenario, I would analyze the Saudi market to answer: \"{message}\". I can help you with property valuations, market trends in Riyadh, or finding investment opportunities."
            ),
        })
    }
}
