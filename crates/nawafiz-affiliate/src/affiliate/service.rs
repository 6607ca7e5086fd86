use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::catalog::ListingCatalog;
use super::contracts::{ContractLedger, ContractLedgerError};
use super::domain::{
    BrokerId, CobrokingRequestId, Contract, ContractTerms, ContractType, LeadId, LeadStatus,
    LeadSubmission, ListingId, DEFAULT_TERMS_VERSION,
};
use super::gate::{ContactDisclosure, DisclosureGate, GateDecision, GateDenial, GateError, GatedAction};
use super::leads::{LeadProtectionView, LeadRegistry, LeadRegistryError};
use super::repository::{ContractRepository, LeadRepository};

/// Facade composing the lead registry, contract ledger, gate and catalog.
pub struct AffiliateService<L, C, K> {
    leads: LeadRegistry<L>,
    contracts: ContractLedger<C>,
    catalog: Arc<K>,
}

impl<L, C, K> AffiliateService<L, C, K>
where
    L: LeadRepository + 'static,
    C: ContractRepository + 'static,
    K: ListingCatalog + 'static,
{
    pub fn new(leads: Arc<L>, contracts: Arc<C>, catalog: Arc<K>) -> Self {
        Self {
            leads: LeadRegistry::new(leads),
            contracts: ContractLedger::new(contracts),
            catalog,
        }
    }

    pub fn leads(&self) -> &LeadRegistry<L> {
        &self.leads
    }

    pub fn contracts(&self) -> &ContractLedger<C> {
        &self.contracts
    }

    pub fn gate(&self) -> DisclosureGate<'_, L, C> {
        DisclosureGate::new(&self.leads, &self.contracts)
    }

    /// Type A: developer to broker marketing agreement for a listing.
    pub fn sign_marketing_contract(
        &self,
        broker_id: &BrokerId,
        broker_name: &str,
        listing_id: &ListingId,
        now: DateTime<Utc>,
    ) -> Result<Contract, AffiliateServiceError> {
        let listing = self
            .catalog
            .listing(listing_id)
            .ok_or_else(|| AffiliateServiceError::ListingNotFound(listing_id.clone()))?;

        let terms = ContractTerms {
            contract_type: ContractType::Marketing,
            reference_id: listing.id.0.clone(),
            party_a: listing.developer_name,
            party_b: broker_name.to_string(),
            terms_version: DEFAULT_TERMS_VERSION.to_string(),
        };
        self.sign(broker_id, terms, now)
    }

    /// Type B: broker to broker non-circumvention agreement for a request.
    pub fn sign_co_broking_contract(
        &self,
        broker_id: &BrokerId,
        broker_name: &str,
        request_id: &CobrokingRequestId,
        now: DateTime<Utc>,
    ) -> Result<Contract, AffiliateServiceError> {
        let request = self
            .catalog
            .cobroking_request(request_id)
            .ok_or_else(|| AffiliateServiceError::RequestNotFound(request_id.clone()))?;

        let terms = ContractTerms {
            contract_type: ContractType::CoBroking,
            reference_id: request.id.0.clone(),
            party_a: request.posted_by.name,
            party_b: broker_name.to_string(),
            terms_version: DEFAULT_TERMS_VERSION.to_string(),
        };
        self.sign(broker_id, terms, now)
    }

    /// Type C: broker to buyer agreement, only for a client the broker holds.
    pub fn generate_brokerage_contract(
        &self,
        broker_id: &BrokerId,
        broker_name: &str,
        lead_id: &LeadId,
        now: DateTime<Utc>,
    ) -> Result<Contract, AffiliateServiceError> {
        let lead = self.leads.get(lead_id)?;
        if &lead.broker_id != broker_id {
            return Err(AffiliateServiceError::ForeignLead(lead_id.clone()));
        }

        self.gate()
            .decide(
                broker_id,
                &GatedAction::GenerateBrokerageContract {
                    listing_id: lead.listing_id.clone(),
                    client_phone: lead.client_phone.as_str().to_string(),
                },
                now,
            )?
            .into_result()
            .map_err(|denial| self.denied(broker_id, denial))?;

        let terms = ContractTerms {
            contract_type: ContractType::Brokerage,
            reference_id: lead.id.0.clone(),
            party_a: lead.client_name,
            party_b: broker_name.to_string(),
            terms_version: DEFAULT_TERMS_VERSION.to_string(),
        };
        self.sign(broker_id, terms, now)
    }

    fn sign(
        &self,
        broker_id: &BrokerId,
        terms: ContractTerms,
        now: DateTime<Utc>,
    ) -> Result<Contract, AffiliateServiceError> {
        match self.contracts.sign_contract(broker_id, terms, now) {
            Ok(contract) => {
                info!(
                    %broker_id,
                    contract_id = %contract.id,
                    contract_type = contract.contract_type.label(),
                    reference_id = %contract.reference_id,
                    "contract signed"
                );
                Ok(contract)
            }
            Err(err @ ContractLedgerError::AlreadyActive { .. }) => {
                warn!(%broker_id, error = %err, "contract signature rejected");
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Register a client after confirming the broker may market the listing.
    pub fn register_lead(
        &self,
        broker_id: &BrokerId,
        submission: LeadSubmission,
        now: DateTime<Utc>,
    ) -> Result<LeadProtectionView, AffiliateServiceError> {
        let listing = self
            .catalog
            .listing(&submission.listing_id)
            .ok_or_else(|| AffiliateServiceError::ListingNotFound(submission.listing_id.clone()))?;

        self.gate()
            .decide(
                broker_id,
                &GatedAction::AddLead {
                    listing_id: listing.id.clone(),
                },
                now,
            )?
            .into_result()
            .map_err(|denial| self.denied(broker_id, denial))?;

        match self
            .leads
            .submit_lead(broker_id, submission, listing.potential_commission(), now)
        {
            Ok(lead) => {
                info!(
                    %broker_id,
                    lead_id = %lead.id,
                    listing_id = %lead.listing_id,
                    expiry_at = %lead.expiry_at,
                    "lead registered"
                );
                Ok(LeadProtectionView::at(&lead, now))
            }
            Err(err @ LeadRegistryError::Duplicate { .. }) => {
                warn!(%broker_id, listing_id = %listing.id, "duplicate lead rejected");
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn advance_lead_status(
        &self,
        broker_id: &BrokerId,
        lead_id: &LeadId,
        status: LeadStatus,
        now: DateTime<Utc>,
    ) -> Result<LeadProtectionView, AffiliateServiceError> {
        let lead = self.leads.get(lead_id)?;
        if &lead.broker_id != broker_id {
            return Err(AffiliateServiceError::ForeignLead(lead_id.clone()));
        }

        let lead = self.leads.advance_status(lead_id, status)?;
        info!(%broker_id, %lead_id, status = status.label(), "lead status advanced");
        Ok(LeadProtectionView::at(&lead, now))
    }

    pub fn leads_for_broker(
        &self,
        broker_id: &BrokerId,
        now: DateTime<Utc>,
    ) -> Result<Vec<LeadProtectionView>, AffiliateServiceError> {
        Ok(self.leads.leads_for_broker(broker_id, now)?)
    }

    pub fn contracts_for_broker(
        &self,
        broker_id: &BrokerId,
    ) -> Result<Vec<Contract>, AffiliateServiceError> {
        Ok(self.contracts.contracts_for_broker(broker_id)?)
    }

    pub fn counterparty_contact(
        &self,
        broker_id: &BrokerId,
        request_id: &CobrokingRequestId,
    ) -> Result<ContactDisclosure, AffiliateServiceError> {
        let request = self
            .catalog
            .cobroking_request(request_id)
            .ok_or_else(|| AffiliateServiceError::RequestNotFound(request_id.clone()))?;
        Ok(self.gate().contact_disclosure(broker_id, &request)?)
    }

    pub fn decide(
        &self,
        broker_id: &BrokerId,
        action: &GatedAction,
        now: DateTime<Utc>,
    ) -> Result<GateDecision, AffiliateServiceError> {
        Ok(self.gate().decide(broker_id, action, now)?)
    }

    fn denied(&self, broker_id: &BrokerId, denial: GateDenial) -> AffiliateServiceError {
        warn!(%broker_id, reason = %denial, "gated action denied");
        AffiliateServiceError::NotAuthorized(denial)
    }
}

/// Error raised by the affiliate service.
#[derive(Debug, thiserror::Error)]
pub enum AffiliateServiceError {
    #[error(transparent)]
    Leads(#[from] LeadRegistryError),
    #[error(transparent)]
    Contracts(#[from] ContractLedgerError),
    #[error("not authorized: {0}")]
    NotAuthorized(GateDenial),
    #[error("lead {0} is registered to another broker")]
    ForeignLead(LeadId),
    #[error("listing {0} not found")]
    ListingNotFound(ListingId),
    #[error("co-broking request {0} not found")]
    RequestNotFound(CobrokingRequestId),
}

impl From<GateError> for AffiliateServiceError {
    fn from(value: GateError) -> Self {
        match value {
            GateError::Leads(err) => Self::Leads(err),
            GateError::Contracts(err) => Self::Contracts(err),
        }
    }
}
