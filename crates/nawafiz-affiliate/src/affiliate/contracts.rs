use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{BrokerId, Contract, ContractId, ContractStatus, ContractTerms, ContractType};
use super::repository::{ContractRepository, RepositoryError};

/// Records signed agreements and answers authorization lookups.
pub struct ContractLedger<R> {
    repository: Arc<R>,
    admission: Mutex<()>,
    sequence: AtomicU64,
}

impl<R> ContractLedger<R>
where
    R: ContractRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            admission: Mutex::new(()),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    fn next_contract_id(&self) -> ContractId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ContractId(format!("C-{id:06}"))
    }

    pub fn has_active_contract(
        &self,
        broker_id: &BrokerId,
        contract_type: ContractType,
        reference_id: &str,
    ) -> Result<bool, ContractLedgerError> {
        Ok(self
            .repository
            .matching(broker_id, contract_type, reference_id)?
            .iter()
            .any(|contract| contract.is_active_for(broker_id, contract_type, reference_id)))
    }

    /// Sign and activate a contract. Re-signing an active reference is rejected,
    /// never merged.
    pub fn sign_contract(
        &self,
        broker_id: &BrokerId,
        terms: ContractTerms,
        now: DateTime<Utc>,
    ) -> Result<Contract, ContractLedgerError> {
        if terms.reference_id.trim().is_empty() {
            return Err(ContractLedgerError::MissingReference);
        }

        let _admission = self
            .admission
            .lock()
            .map_err(|_| RepositoryError::Unavailable("contract admission poisoned".to_string()))?;

        if self.has_active_contract(broker_id, terms.contract_type, &terms.reference_id)? {
            return Err(ContractLedgerError::AlreadyActive {
                contract_type: terms.contract_type,
                reference_id: terms.reference_id,
            });
        }

        let contract = Contract {
            id: self.next_contract_id(),
            contract_type: terms.contract_type,
            status: ContractStatus::Active,
            broker_id: broker_id.clone(),
            reference_id: terms.reference_id,
            party_a: terms.party_a,
            party_b: terms.party_b,
            signed_at: now,
            terms_version: terms.terms_version,
        };

        Ok(self.repository.insert(contract)?)
    }

    pub fn contracts_for_broker(
        &self,
        broker_id: &BrokerId,
    ) -> Result<Vec<Contract>, ContractLedgerError> {
        Ok(self.repository.for_broker(broker_id)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContractLedgerError {
    #[error("an active {} contract already exists for {reference_id}", contract_type.label())]
    AlreadyActive {
        contract_type: ContractType,
        reference_id: String,
    },
    #[error("contract reference is required")]
    MissingReference,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
