use super::domain::{
    BrokerId, ClientPhone, Contract, ContractType, Lead, LeadId, ListingId,
};

/// Storage abstraction for lead records so the registry can be exercised in isolation.
///
/// Implementations keep insertion order and never delete records.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError>;
    fn update(&self, lead: Lead) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError>;
    /// Every lead, expired or not, registered for the client on this listing.
    fn for_client(
        &self,
        listing_id: &ListingId,
        phone: &ClientPhone,
    ) -> Result<Vec<Lead>, RepositoryError>;
    fn for_broker(&self, broker_id: &BrokerId) -> Result<Vec<Lead>, RepositoryError>;
}

/// Storage abstraction for the contract ledger.
pub trait ContractRepository: Send + Sync {
    fn insert(&self, contract: Contract) -> Result<Contract, RepositoryError>;
    fn matching(
        &self,
        broker_id: &BrokerId,
        contract_type: ContractType,
        reference_id: &str,
    ) -> Result<Vec<Contract>, RepositoryError>;
    fn for_broker(&self, broker_id: &BrokerId) -> Result<Vec<Contract>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
