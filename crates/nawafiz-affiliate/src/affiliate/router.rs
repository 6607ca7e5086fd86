use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::catalog::ListingCatalog;
use super::contracts::ContractLedgerError;
use super::domain::{BrokerId, CobrokingRequestId, LeadId, LeadStatus, ListingId, LeadSubmission};
use super::gate::GatedAction;
use super::leads::LeadRegistryError;
use super::repository::{ContractRepository, LeadRepository, RepositoryError};
use super::service::{AffiliateService, AffiliateServiceError};

type SharedService<L, C, K> = Arc<AffiliateService<L, C, K>>;

#[derive(Debug, Deserialize)]
pub(crate) struct MarketingContractRequest {
    pub(crate) broker_id: BrokerId,
    pub(crate) broker_name: String,
    pub(crate) listing_id: ListingId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoBrokingContractRequest {
    pub(crate) broker_id: BrokerId,
    pub(crate) broker_name: String,
    pub(crate) request_id: CobrokingRequestId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BrokerageContractRequest {
    pub(crate) broker_id: BrokerId,
    pub(crate) broker_name: String,
    pub(crate) lead_id: LeadId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeadRequest {
    pub(crate) broker_id: BrokerId,
    pub(crate) listing_id: ListingId,
    pub(crate) client_name: String,
    pub(crate) client_phone: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeadStatusRequest {
    pub(crate) broker_id: BrokerId,
    pub(crate) status: LeadStatus,
}

/// Read-only; `now` lets a caller ask how the gate answers at another instant.
#[derive(Debug, Deserialize)]
pub(crate) struct GateRequest {
    pub(crate) broker_id: BrokerId,
    pub(crate) action: GatedAction,
    #[serde(default)]
    pub(crate) now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BrokerQuery {
    pub(crate) broker_id: BrokerId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AsOfQuery {
    #[serde(default)]
    pub(crate) now: Option<DateTime<Utc>>,
}

/// Router builder exposing the lead vault, contract signing and disclosure gate.
pub fn affiliate_router<L, C, K>(service: SharedService<L, C, K>) -> Router
where
    L: LeadRepository + 'static,
    C: ContractRepository + 'static,
    K: ListingCatalog + 'static,
{
    Router::new()
        .route(
            "/api/v1/affiliate/contracts/marketing",
            post(marketing_contract_handler::<L, C, K>),
        )
        .route(
            "/api/v1/affiliate/contracts/co-broking",
            post(co_broking_contract_handler::<L, C, K>),
        )
        .route(
            "/api/v1/affiliate/contracts/brokerage",
            post(brokerage_contract_handler::<L, C, K>),
        )
        .route(
            "/api/v1/affiliate/brokers/:broker_id/contracts",
            get(broker_contracts_handler::<L, C, K>),
        )
        .route("/api/v1/affiliate/leads", post(lead_handler::<L, C, K>))
        .route(
            "/api/v1/affiliate/brokers/:broker_id/leads",
            get(broker_leads_handler::<L, C, K>),
        )
        .route(
            "/api/v1/affiliate/leads/:lead_id/status",
            post(lead_status_handler::<L, C, K>),
        )
        .route(
            "/api/v1/affiliate/cobroking/:request_id/contact",
            get(contact_handler::<L, C, K>),
        )
        .route("/api/v1/affiliate/gate", post(gate_handler::<L, C, K>))
        .with_state(service)
}

pub(crate) async fn marketing_contract_handler<L, C, K>(
    State(service): State<SharedService<L, C, K>>,
    axum::Json(request): axum::Json<MarketingContractRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    C: ContractRepository + 'static,
    K: ListingCatalog + 'static,
{
    match service.sign_marketing_contract(
        &request.broker_id,
        &request.broker_name,
        &request.listing_id,
        Utc::now(),
    ) {
        Ok(contract) => (StatusCode::CREATED, axum::Json(contract)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn co_broking_contract_handler<L, C, K>(
    State(service): State<SharedService<L, C, K>>,
    axum::Json(request): axum::Json<CoBrokingContractRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    C: ContractRepository + 'static,
    K: ListingCatalog + 'static,
{
    match service.sign_co_broking_contract(
        &request.broker_id,
        &request.broker_name,
        &request.request_id,
        Utc::now(),
    ) {
        Ok(contract) => (StatusCode::CREATED, axum::Json(contract)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn brokerage_contract_handler<L, C, K>(
    State(service): State<SharedService<L, C, K>>,
    axum::Json(request): axum::Json<BrokerageContractRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    C: ContractRepository + 'static,
    K: ListingCatalog + 'static,
{
    match service.generate_brokerage_contract(
        &request.broker_id,
        &request.broker_name,
        &request.lead_id,
        Utc::now(),
    ) {
        Ok(contract) => (StatusCode::CREATED, axum::Json(contract)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn broker_contracts_handler<L, C, K>(
    State(service): State<SharedService<L, C, K>>,
    Path(broker_id): Path<String>,
) -> Response
where
    L: LeadRepository + 'static,
    C: ContractRepository + 'static,
    K: ListingCatalog + 'static,
{
    match service.contracts_for_broker(&BrokerId(broker_id)) {
        Ok(contracts) => (StatusCode::OK, axum::Json(contracts)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn lead_handler<L, C, K>(
    State(service): State<SharedService<L, C, K>>,
    axum::Json(request): axum::Json<LeadRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    C: ContractRepository + 'static,
    K: ListingCatalog + 'static,
{
    let LeadRequest {
        broker_id,
        listing_id,
        client_name,
        client_phone,
    } = request;
    let submission = LeadSubmission {
        listing_id,
        client_name,
        client_phone,
    };

    // Registration time is always the server clock.
    match service.register_lead(&broker_id, submission, Utc::now()) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn broker_leads_handler<L, C, K>(
    State(service): State<SharedService<L, C, K>>,
    Path(broker_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    L: LeadRepository + 'static,
    C: ContractRepository + 'static,
    K: ListingCatalog + 'static,
{
    let now = query.now.unwrap_or_else(Utc::now);
    match service.leads_for_broker(&BrokerId(broker_id), now) {
        Ok(leads) => (StatusCode::OK, axum::Json(leads)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn lead_status_handler<L, C, K>(
    State(service): State<SharedService<L, C, K>>,
    Path(lead_id): Path<String>,
    axum::Json(request): axum::Json<LeadStatusRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    C: ContractRepository + 'static,
    K: ListingCatalog + 'static,
{
    match service.advance_lead_status(
        &request.broker_id,
        &LeadId(lead_id),
        request.status,
        Utc::now(),
    ) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn contact_handler<L, C, K>(
    State(service): State<SharedService<L, C, K>>,
    Path(request_id): Path<String>,
    Query(query): Query<BrokerQuery>,
) -> Response
where
    L: LeadRepository + 'static,
    C: ContractRepository + 'static,
    K: ListingCatalog + 'static,
{
    match service.counterparty_contact(&query.broker_id, &CobrokingRequestId(request_id)) {
        Ok(disclosure) => (StatusCode::OK, axum::Json(disclosure)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn gate_handler<L, C, K>(
    State(service): State<SharedService<L, C, K>>,
    axum::Json(request): axum::Json<GateRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    C: ContractRepository + 'static,
    K: ListingCatalog + 'static,
{
    let now = request.now.unwrap_or_else(Utc::now);
    match service.decide(&request.broker_id, &request.action, now) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) fn status_for(err: &AffiliateServiceError) -> StatusCode {
    match err {
        AffiliateServiceError::Leads(LeadRegistryError::Duplicate { .. })
        | AffiliateServiceError::Contracts(ContractLedgerError::AlreadyActive { .. }) => {
            StatusCode::CONFLICT
        }
        AffiliateServiceError::Leads(LeadRegistryError::InvalidTransition { .. })
        | AffiliateServiceError::Leads(LeadRegistryError::InvalidSubmission(_))
        | AffiliateServiceError::Contracts(ContractLedgerError::MissingReference) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AffiliateServiceError::NotAuthorized(_) | AffiliateServiceError::ForeignLead(_) => {
            StatusCode::FORBIDDEN
        }
        AffiliateServiceError::Leads(LeadRegistryError::NotFound(_))
        | AffiliateServiceError::Leads(LeadRegistryError::Repository(RepositoryError::NotFound))
        | AffiliateServiceError::ListingNotFound(_)
        | AffiliateServiceError::RequestNotFound(_) => StatusCode::NOT_FOUND,
        AffiliateServiceError::Leads(LeadRegistryError::Repository(_))
        | AffiliateServiceError::Contracts(ContractLedgerError::Repository(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: AffiliateServiceError) -> Response {
    let status = status_for(&err);
    let payload = match &err {
        AffiliateServiceError::NotAuthorized(denial) => json!({
            "error": err.to_string(),
            "denial": denial,
        }),
        _ => json!({ "error": err.to_string() }),
    };
    (status, axum::Json(payload)).into_response()
}
