//! Lead protection and conditional disclosure for the affiliate network.
//!
//! The lead registry and contract ledger own all mutable state. The disclosure
//! gate composes them into read-only permit/deny decisions, and the service
//! facade runs those checks before every protected action.

pub mod catalog;
pub mod contracts;
pub mod domain;
pub mod gate;
pub mod leads;
pub mod memory;
pub mod pipeline;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{CobrokingKind, CobrokingPoster, CobrokingRequest, Listing, ListingCatalog, StaticCatalog};
pub use contracts::{ContractLedger, ContractLedgerError};
pub use domain::{
    BrokerId, ClientPhone, CobrokingRequestId, Contract, ContractId, ContractStatus,
    ContractTerms, ContractType, Lead, LeadId, LeadStatus, LeadSubmission, ListingId,
    DEFAULT_TERMS_VERSION, PROTECTION_WINDOW_DAYS,
};
pub use gate::{ContactDisclosure, DisclosureGate, GateDecision, GateDenial, GateError, GatedAction};
pub use leads::{LeadProtectionView, LeadRegistry, LeadRegistryError};
pub use memory::{InMemoryContractRepository, InMemoryLeadRepository};
pub use pipeline::{DealStage, DealTracker, StageTransitionError};
pub use repository::{ContractRepository, LeadRepository, RepositoryError};
pub use router::affiliate_router;
pub use service::{AffiliateService, AffiliateServiceError};
