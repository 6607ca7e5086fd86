use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::CobrokingRequest;
use super::contracts::{ContractLedger, ContractLedgerError};
use super::domain::{BrokerId, ClientPhone, CobrokingRequestId, ContractType, ListingId};
use super::leads::{LeadRegistry, LeadRegistryError};
use super::pipeline::DealStage;
use super::repository::{ContractRepository, LeadRepository};

const MASKED_PHONE: &str = "05XXXXXXXX";

/// Protected actions a broker can attempt from the affiliate screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatedAction {
    StartMarketing { listing_id: ListingId },
    AddLead { listing_id: ListingId },
    RevealContact { request_id: CobrokingRequestId },
    GenerateBrokerageContract {
        listing_id: ListingId,
        client_phone: String,
    },
}

/// Why an action was refused, phrased as the corrective step to take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GateDenial {
    #[error("sign the marketing agreement for listing {listing_id} before registering leads")]
    MarketingContractRequired { listing_id: ListingId },
    #[error("sign the co-broking non-circumvention agreement for {request_id} to reveal the contact")]
    CoBrokingContractRequired { request_id: CobrokingRequestId },
    #[error("register this client on listing {listing_id} before generating a brokerage contract")]
    ProtectedLeadRequired { listing_id: ListingId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateDecision {
    pub permitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial: Option<GateDenial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

impl GateDecision {
    fn permit() -> Self {
        Self {
            permitted: true,
            denial: None,
            guidance: None,
        }
    }

    fn deny(denial: GateDenial) -> Self {
        Self {
            permitted: false,
            guidance: Some(denial.to_string()),
            denial: Some(denial),
        }
    }

    pub fn into_result(self) -> Result<(), GateDenial> {
        match self.denial {
            Some(denial) => Err(denial),
            None => Ok(()),
        }
    }
}

/// Counter-party contact as the requesting broker is allowed to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "visibility", rename_all = "snake_case")]
pub enum ContactDisclosure {
    Revealed {
        name: String,
        phone: String,
        company: String,
    },
    Masked {
        name: String,
        phone: &'static str,
        guidance: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error(transparent)]
    Leads(#[from] LeadRegistryError),
    #[error(transparent)]
    Contracts(#[from] ContractLedgerError),
}

/// Read-only authorization view over the lead registry and contract ledger.
///
/// Every query is a pure function of the stored state; nothing here mutates.
pub struct DisclosureGate<'a, L, C> {
    leads: &'a LeadRegistry<L>,
    contracts: &'a ContractLedger<C>,
}

impl<'a, L, C> DisclosureGate<'a, L, C>
where
    L: LeadRepository,
    C: ContractRepository,
{
    pub fn new(leads: &'a LeadRegistry<L>, contracts: &'a ContractLedger<C>) -> Self {
        Self { leads, contracts }
    }

    /// Initiating a marketing signature is always allowed.
    pub fn can_start_marketing(&self, _broker_id: &BrokerId, _listing_id: &ListingId) -> bool {
        true
    }

    pub fn can_add_lead(
        &self,
        broker_id: &BrokerId,
        listing_id: &ListingId,
    ) -> Result<bool, GateError> {
        Ok(self
            .contracts
            .has_active_contract(broker_id, ContractType::Marketing, &listing_id.0)?)
    }

    pub fn can_reveal_contact(
        &self,
        broker_id: &BrokerId,
        request_id: &CobrokingRequestId,
    ) -> Result<bool, GateError> {
        Ok(self
            .contracts
            .has_active_contract(broker_id, ContractType::CoBroking, &request_id.0)?)
    }

    pub fn can_generate_brokerage_contract(
        &self,
        broker_id: &BrokerId,
        listing_id: &ListingId,
        client_phone: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, GateError> {
        let phone = ClientPhone::normalize(client_phone);
        Ok(self
            .leads
            .protected_lead_for(broker_id, listing_id, &phone, now)?
            .is_some())
    }

    pub fn decide(
        &self,
        broker_id: &BrokerId,
        action: &GatedAction,
        now: DateTime<Utc>,
    ) -> Result<GateDecision, GateError> {
        let decision = match action {
            GatedAction::StartMarketing { listing_id } => {
                if self.can_start_marketing(broker_id, listing_id) {
                    GateDecision::permit()
                } else {
                    GateDecision::deny(GateDenial::MarketingContractRequired {
                        listing_id: listing_id.clone(),
                    })
                }
            }
            GatedAction::AddLead { listing_id } => {
                if self.can_add_lead(broker_id, listing_id)? {
                    GateDecision::permit()
                } else {
                    GateDecision::deny(GateDenial::MarketingContractRequired {
                        listing_id: listing_id.clone(),
                    })
                }
            }
            GatedAction::RevealContact { request_id } => {
                if self.can_reveal_contact(broker_id, request_id)? {
                    GateDecision::permit()
                } else {
                    GateDecision::deny(GateDenial::CoBrokingContractRequired {
                        request_id: request_id.clone(),
                    })
                }
            }
            GatedAction::GenerateBrokerageContract {
                listing_id,
                client_phone,
            } => {
                if self.can_generate_brokerage_contract(broker_id, listing_id, client_phone, now)? {
                    GateDecision::permit()
                } else {
                    GateDecision::deny(GateDenial::ProtectedLeadRequired {
                        listing_id: listing_id.clone(),
                    })
                }
            }
        };

        Ok(decision)
    }

    /// Poster contact for a co-broking request, blurred until the
    /// non-circumvention agreement is active.
    pub fn contact_disclosure(
        &self,
        broker_id: &BrokerId,
        request: &CobrokingRequest,
    ) -> Result<ContactDisclosure, GateError> {
        let poster = &request.posted_by;
        if self.can_reveal_contact(broker_id, &request.id)? {
            return Ok(ContactDisclosure::Revealed {
                name: poster.name.clone(),
                phone: poster.phone.clone(),
                company: poster.company.clone(),
            });
        }

        let denial = GateDenial::CoBrokingContractRequired {
            request_id: request.id.clone(),
        };
        Ok(ContactDisclosure::Masked {
            name: poster.name.clone(),
            phone: MASKED_PHONE,
            guidance: denial.to_string(),
        })
    }

    pub fn pipeline_progress_percent(stage: DealStage) -> u8 {
        stage.progress_percent()
    }

    pub fn next_allowed_stages(stage: DealStage) -> Vec<DealStage> {
        stage.next_allowed()
    }
}
