use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use nawafiz_affiliate::affiliate::{
    AffiliateService, InMemoryContractRepository, InMemoryLeadRepository, StaticCatalog,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type MemoryAffiliateService =
    AffiliateService<InMemoryLeadRepository, InMemoryContractRepository, StaticCatalog>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local affiliate engine over the seeded listing catalog.
pub(crate) fn in_memory_affiliate_service() -> Arc<MemoryAffiliateService> {
    Arc::new(AffiliateService::new(
        Arc::new(InMemoryLeadRepository::default()),
        Arc::new(InMemoryContractRepository::default()),
        Arc::new(StaticCatalog::seeded()),
    ))
}

/// Accepts either `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| format!("'{raw}' is out of range"));
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD or RFC 3339 ({err})"))
}
