use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    BrokerId, ClientPhone, Contract, ContractType, Lead, LeadId, ListingId,
};
use super::repository::{ContractRepository, LeadRepository, RepositoryError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

/// Process-local lead table. State is lost on restart.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLeadRepository {
    records: Arc<Mutex<Vec<Lead>>>,
}

impl InMemoryLeadRepository {
    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self {
            records: Arc::new(Mutex::new(leads)),
        }
    }
}

impl LeadRepository for InMemoryLeadRepository {
    fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.iter().any(|existing| existing.id == lead.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(lead.clone());
        Ok(lead)
    }

    fn update(&self, lead: Lead) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        match guard.iter_mut().find(|existing| existing.id == lead.id) {
            Some(slot) => {
                *slot = lead;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.iter().find(|lead| &lead.id == id).cloned())
    }

    fn for_client(
        &self,
        listing_id: &ListingId,
        phone: &ClientPhone,
    ) -> Result<Vec<Lead>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard
            .iter()
            .filter(|lead| lead.matches_client(listing_id, phone))
            .cloned()
            .collect())
    }

    fn for_broker(&self, broker_id: &BrokerId) -> Result<Vec<Lead>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard
            .iter()
            .filter(|lead| &lead.broker_id == broker_id)
            .cloned()
            .collect())
    }
}

/// Process-local contract table.
#[derive(Debug, Default, Clone)]
pub struct InMemoryContractRepository {
    records: Arc<Mutex<Vec<Contract>>>,
}

impl InMemoryContractRepository {
    pub fn with_contracts(contracts: Vec<Contract>) -> Self {
        Self {
            records: Arc::new(Mutex::new(contracts)),
        }
    }
}

impl ContractRepository for InMemoryContractRepository {
    fn insert(&self, contract: Contract) -> Result<Contract, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.iter().any(|existing| existing.id == contract.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(contract.clone());
        Ok(contract)
    }

    fn matching(
        &self,
        broker_id: &BrokerId,
        contract_type: ContractType,
        reference_id: &str,
    ) -> Result<Vec<Contract>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard
            .iter()
            .filter(|contract| {
                &contract.broker_id == broker_id
                    && contract.contract_type == contract_type
                    && contract.reference_id == reference_id
            })
            .cloned()
            .collect())
    }

    fn for_broker(&self, broker_id: &BrokerId) -> Result<Vec<Contract>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard
            .iter()
            .filter(|contract| &contract.broker_id == broker_id)
            .cloned()
            .collect())
    }
}
