use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::domain::{
    BrokerId, ClientPhone, Lead, LeadId, LeadStatus, LeadSubmission, ListingId,
    PROTECTION_WINDOW_DAYS,
};
use super::repository::{LeadRepository, RepositoryError};

/// Owns lead records and the per-listing exclusivity rule.
pub struct LeadRegistry<R> {
    repository: Arc<R>,
    admission: Mutex<()>,
    sequence: AtomicU64,
}

impl<R> LeadRegistry<R>
where
    R: LeadRepository,
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

    fn next_lead_id(&self) -> LeadId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        LeadId(format!("LEAD-{id:06}"))
    }

    /// Register a client against a listing, locking them to `broker_id` for the
    /// protection window.
    pub fn submit_lead(
        &self,
        broker_id: &BrokerId,
        submission: LeadSubmission,
        potential_commission: f64,
        now: DateTime<Utc>,
    ) -> Result<Lead, LeadRegistryError> {
        let client_name = submission.client_name.trim().to_string();
        if client_name.is_empty() {
            return Err(LeadRegistryError::InvalidSubmission(
                "client name is required".to_string(),
            ));
        }
        let client_phone = ClientPhone::normalize(&submission.client_phone);
        if client_phone.is_empty() {
            return Err(LeadRegistryError::InvalidSubmission(
                "client phone must contain digits".to_string(),
            ));
        }

        // Duplicate scan and insert form one step.
        let _admission = self
            .admission
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lead admission poisoned".to_string()))?;

        let existing = self
            .repository
            .for_client(&submission.listing_id, &client_phone)?;
        if let Some(protected) = existing.iter().find(|lead| lead.is_protected(now)) {
            return Err(LeadRegistryError::Duplicate {
                listing_id: submission.listing_id,
                protected_until: protected.expiry_at,
            });
        }

        let lead = Lead {
            id: self.next_lead_id(),
            broker_id: broker_id.clone(),
            listing_id: submission.listing_id,
            client_name,
            client_phone,
            submitted_at: now,
            expiry_at: now + Lead::protection_window(),
            status: LeadStatus::New,
            potential_commission,
        };

        Ok(self.repository.insert(lead)?)
    }

    pub fn get(&self, lead_id: &LeadId) -> Result<Lead, LeadRegistryError> {
        self.repository
            .fetch(lead_id)?
            .ok_or_else(|| LeadRegistryError::NotFound(lead_id.clone()))
    }

    pub fn is_protected(&self, lead_id: &LeadId, now: DateTime<Utc>) -> Result<bool, LeadRegistryError> {
        Ok(self.get(lead_id)?.is_protected(now))
    }

    pub fn days_remaining(&self, lead_id: &LeadId, now: DateTime<Utc>) -> Result<i64, LeadRegistryError> {
        Ok(self.get(lead_id)?.days_remaining(now))
    }

    pub fn advance_status(
        &self,
        lead_id: &LeadId,
        status: LeadStatus,
    ) -> Result<Lead, LeadRegistryError> {
        // Read, transition check and write form one step.
        let _admission = self
            .admission
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lead admission poisoned".to_string()))?;

        let mut lead = self.get(lead_id)?;
        if !lead.status.can_advance_to(status) {
            return Err(LeadRegistryError::InvalidTransition {
                from: lead.status,
                to: status,
            });
        }
        lead.status = status;
        self.repository.update(lead.clone())?;
        Ok(lead)
    }

    /// Unexpired, unrejected lead held by `broker_id` for this client and listing.
    pub fn protected_lead_for(
        &self,
        broker_id: &BrokerId,
        listing_id: &ListingId,
        phone: &ClientPhone,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, LeadRegistryError> {
        Ok(self
            .repository
            .for_client(listing_id, phone)?
            .into_iter()
            .find(|lead| {
                &lead.broker_id == broker_id
                    && lead.is_protected(now)
                    && lead.status != LeadStatus::Rejected
            }))
    }

    /// Broker's leads, most recent first, with their protection state at `now`.
    pub fn leads_for_broker(
        &self,
        broker_id: &BrokerId,
        now: DateTime<Utc>,
    ) -> Result<Vec<LeadProtectionView>, LeadRegistryError> {
        let mut leads = self.repository.for_broker(broker_id)?;
        leads.reverse();
        Ok(leads
            .iter()
            .map(|lead| LeadProtectionView::at(lead, now))
            .collect())
    }
}

/// Lead card as rendered in the "My Protected Leads" table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadProtectionView {
    pub lead_id: LeadId,
    pub listing_id: ListingId,
    pub client_name: String,
    pub client_phone: ClientPhone,
    pub status: &'static str,
    pub days_remaining: i64,
    pub expired: bool,
    pub protection_percent: u8,
    pub expiry_date: NaiveDate,
    pub potential_commission: f64,
}

impl LeadProtectionView {
    pub fn at(lead: &Lead, now: DateTime<Utc>) -> Self {
        let days_remaining = lead.days_remaining(now);
        let protection_percent =
            (days_remaining * 100 / PROTECTION_WINDOW_DAYS).clamp(0, 100) as u8;

        Self {
            lead_id: lead.id.clone(),
            listing_id: lead.listing_id.clone(),
            client_name: lead.client_name.clone(),
            client_phone: lead.client_phone.clone(),
            status: if days_remaining == 0 {
                "Expired"
            } else {
                lead.status.label()
            },
            days_remaining,
            expired: days_remaining == 0,
            protection_percent,
            expiry_date: lead.expiry_at.date_naive(),
            potential_commission: lead.potential_commission,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LeadRegistryError {
    #[error("client is already protected on listing {listing_id} until {protected_until}")]
    Duplicate {
        listing_id: ListingId,
        protected_until: DateTime<Utc>,
    },
    #[error("lead cannot move from {} to {}", from.label(), to.label())]
    InvalidTransition { from: LeadStatus, to: LeadStatus },
    #[error("lead {0} not found")]
    NotFound(LeadId),
    #[error("invalid lead submission: {0}")]
    InvalidSubmission(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
