use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::affiliate::domain::{
    BrokerId, ClientPhone, CobrokingRequestId, Lead, LeadId, LeadSubmission, ListingId,
};
use crate::affiliate::memory::{InMemoryContractRepository, InMemoryLeadRepository};
use crate::affiliate::repository::{LeadRepository, RepositoryError};
use crate::affiliate::{affiliate_router, AffiliateService, StaticCatalog};

pub(super) type MemoryService =
    AffiliateService<InMemoryLeadRepository, InMemoryContractRepository, StaticCatalog>;

pub(super) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn days_after(days: i64) -> DateTime<Utc> {
    t0() + Duration::days(days)
}

pub(super) fn broker_a() -> BrokerId {
    BrokerId("broker-a".to_string())
}

pub(super) fn broker_b() -> BrokerId {
    BrokerId("broker-b".to_string())
}

pub(super) fn sedra() -> ListingId {
    ListingId("L101".to_string())
}

pub(super) fn ewan() -> ListingId {
    ListingId("L102".to_string())
}

pub(super) fn buyer_request() -> CobrokingRequestId {
    CobrokingRequestId("REQ-001".to_string())
}

pub(super) fn submission(listing_id: ListingId, name: &str, phone: &str) -> LeadSubmission {
    LeadSubmission {
        listing_id,
        client_name: name.to_string(),
        client_phone: phone.to_string(),
    }
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryLeadRepository>,
    Arc<InMemoryContractRepository>,
) {
    let leads = Arc::new(InMemoryLeadRepository::default());
    let contracts = Arc::new(InMemoryContractRepository::default());
    let service = AffiliateService::new(
        leads.clone(),
        contracts.clone(),
        Arc::new(StaticCatalog::seeded()),
    );
    (service, leads, contracts)
}

/// Service where `broker` already holds the marketing agreement for `listing_id`.
pub(super) fn marketing_service(broker: &BrokerId, listing_id: &ListingId) -> MemoryService {
    let (service, _, _) = build_service();
    service
        .sign_marketing_contract(broker, "Broker", listing_id, t0())
        .expect("marketing contract signs");
    service
}

pub(super) fn expired_lead(broker: &BrokerId, listing_id: &ListingId, phone: &str) -> Lead {
    let submitted_at = t0() - Duration::days(90);
    Lead {
        id: LeadId("LEAD-HISTORIC".to_string()),
        broker_id: broker.clone(),
        listing_id: listing_id.clone(),
        client_name: "Historic Client".to_string(),
        client_phone: ClientPhone::normalize(phone),
        submitted_at,
        expiry_at: submitted_at + Lead::protection_window(),
        status: crate::affiliate::LeadStatus::Negotiation,
        potential_commission: 0.0,
    }
}

pub(super) struct UnavailableLeads;

impl LeadRepository for UnavailableLeads {
    fn insert(&self, _lead: Lead) -> Result<Lead, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn update(&self, _lead: Lead) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn for_client(
        &self,
        _listing_id: &ListingId,
        _phone: &ClientPhone,
    ) -> Result<Vec<Lead>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn for_broker(&self, _broker_id: &BrokerId) -> Result<Vec<Lead>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    affiliate_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
