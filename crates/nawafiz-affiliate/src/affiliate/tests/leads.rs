use super::common::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

use crate::affiliate::domain::{BrokerId, ClientPhone, Lead, LeadId, LeadStatus, ListingId};
use crate::affiliate::leads::{LeadRegistry, LeadRegistryError};
use crate::affiliate::memory::InMemoryLeadRepository;
use crate::affiliate::repository::{LeadRepository, RepositoryError};

fn registry() -> LeadRegistry<InMemoryLeadRepository> {
    LeadRegistry::new(Arc::new(InMemoryLeadRepository::default()))
}

#[test]
fn submit_locks_client_for_sixty_days() {
    let registry = registry();

    let lead = registry
        .submit_lead(
            &broker_a(),
            submission(sedra(), "Abdullah", "050-123-4567"),
            75_000.0,
            t0(),
        )
        .expect("first registration succeeds");

    assert_eq!(lead.status, LeadStatus::New);
    assert_eq!(lead.client_phone.as_str(), "0501234567");
    assert_eq!(lead.expiry_at, days_after(60));
    assert_eq!(registry.days_remaining(&lead.id, t0()).expect("lead exists"), 60);
    assert!(registry.is_protected(&lead.id, t0()).expect("lead exists"));
}

#[test]
fn duplicate_phone_on_same_listing_is_rejected_without_mutation() {
    let registry = registry();
    registry
        .submit_lead(&broker_a(), submission(sedra(), "Abdullah", "0501234567"), 0.0, t0())
        .expect("first registration succeeds");

    match registry.submit_lead(
        &broker_b(),
        submission(sedra(), "Other Name", "(050) 123 4567"),
        0.0,
        t0(),
    ) {
        Err(LeadRegistryError::Duplicate {
            listing_id,
            protected_until,
        }) => {
            assert_eq!(listing_id, sedra());
            assert_eq!(protected_until, days_after(60));
        }
        other => panic!("expected duplicate lead error, got {other:?}"),
    }

    let stored = registry
        .repository()
        .for_client(&sedra(), &ClientPhone::normalize("0501234567"))
        .expect("lookup succeeds");
    assert_eq!(stored.len(), 1);
    assert!(registry
        .repository()
        .for_broker(&broker_b())
        .expect("lookup succeeds")
        .is_empty());
}

#[test]
fn same_phone_on_another_listing_is_independent() {
    let registry = registry();
    registry
        .submit_lead(&broker_a(), submission(sedra(), "Abdullah", "0501234567"), 0.0, t0())
        .expect("first listing");
    registry
        .submit_lead(&broker_b(), submission(ewan(), "Abdullah", "0501234567"), 0.0, t0())
        .expect("other listing is not blocked");
}

#[test]
fn country_code_variant_is_a_different_client() {
    let registry = registry();
    registry
        .submit_lead(&broker_a(), submission(sedra(), "Abdullah", "0501234567"), 0.0, t0())
        .expect("local format");
    registry
        .submit_lead(&broker_b(), submission(sedra(), "Abdullah", "+966501234567"), 0.0, t0())
        .expect("international format is a distinct key");
}

#[test]
fn expired_lead_releases_lock_and_stays_as_audit_record() {
    let repository = Arc::new(InMemoryLeadRepository::with_leads(vec![expired_lead(
        &broker_a(),
        &sedra(),
        "0501234567",
    )]));
    let registry = LeadRegistry::new(repository.clone());

    let fresh = registry
        .submit_lead(&broker_b(), submission(sedra(), "Abdullah", "0501234567"), 0.0, t0())
        .expect("expired lead does not block");

    let history = repository
        .for_client(&sedra(), &fresh.client_phone)
        .expect("lookup succeeds");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, LeadId("LEAD-HISTORIC".to_string()));
    assert_eq!(history[0].status, LeadStatus::Negotiation);
}

#[test]
fn days_remaining_clamps_to_zero_after_expiry() {
    let registry = registry();
    let lead = registry
        .submit_lead(&broker_a(), submission(sedra(), "Abdullah", "0501234567"), 0.0, t0())
        .expect("registration succeeds");

    assert_eq!(registry.days_remaining(&lead.id, days_after(61)).expect("lead"), 0);
    assert!(!registry.is_protected(&lead.id, days_after(61)).expect("lead"));
}

#[test]
fn rejects_blank_name_and_phone_without_digits() {
    let registry = registry();

    assert!(matches!(
        registry.submit_lead(&broker_a(), submission(sedra(), "   ", "0501234567"), 0.0, t0()),
        Err(LeadRegistryError::InvalidSubmission(_))
    ));
    assert!(matches!(
        registry.submit_lead(&broker_a(), submission(sedra(), "Abdullah", "call me"), 0.0, t0()),
        Err(LeadRegistryError::InvalidSubmission(_))
    ));
}

#[test]
fn advance_status_follows_forward_chain() {
    let registry = registry();
    let lead = registry
        .submit_lead(&broker_a(), submission(sedra(), "Abdullah", "0501234567"), 0.0, t0())
        .expect("registration succeeds");

    match registry.advance_status(&lead.id, LeadStatus::Closed) {
        Err(LeadRegistryError::InvalidTransition { from, to }) => {
            assert_eq!(from, LeadStatus::New);
            assert_eq!(to, LeadStatus::Closed);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }

    for status in [LeadStatus::Contacted, LeadStatus::Negotiation, LeadStatus::Closed] {
        let updated = registry
            .advance_status(&lead.id, status)
            .expect("forward move allowed");
        assert_eq!(updated.status, status);
    }

    assert!(matches!(
        registry.advance_status(&lead.id, LeadStatus::Negotiation),
        Err(LeadRegistryError::InvalidTransition { .. })
    ));
    assert_eq!(registry.get(&lead.id).expect("lead").status, LeadStatus::Closed);
}

/// Delays reads so concurrent status updates overlap.
struct SlowFetchLeads {
    inner: InMemoryLeadRepository,
}

impl LeadRepository for SlowFetchLeads {
    fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError> {
        self.inner.insert(lead)
    }

    fn update(&self, lead: Lead) -> Result<(), RepositoryError> {
        self.inner.update(lead)
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        thread::sleep(StdDuration::from_millis(50));
        self.inner.fetch(id)
    }

    fn for_client(
        &self,
        listing_id: &ListingId,
        phone: &ClientPhone,
    ) -> Result<Vec<Lead>, RepositoryError> {
        self.inner.for_client(listing_id, phone)
    }

    fn for_broker(&self, broker_id: &BrokerId) -> Result<Vec<Lead>, RepositoryError> {
        self.inner.for_broker(broker_id)
    }
}

#[test]
fn concurrent_status_updates_cannot_both_leave_a_state() {
    let registry = LeadRegistry::new(Arc::new(SlowFetchLeads {
        inner: InMemoryLeadRepository::default(),
    }));
    let lead = registry
        .submit_lead(&broker_a(), submission(sedra(), "Abdullah", "0501234567"), 0.0, t0())
        .expect("registration succeeds");
    for status in [LeadStatus::Contacted, LeadStatus::Negotiation] {
        registry.advance_status(&lead.id, status).expect("forward move");
    }

    let (rejected, closed) = thread::scope(|scope| {
        let rejecting = scope.spawn(|| registry.advance_status(&lead.id, LeadStatus::Rejected));
        let closing = scope.spawn(|| registry.advance_status(&lead.id, LeadStatus::Closed));
        (
            rejecting.join().expect("thread completes"),
            closing.join().expect("thread completes"),
        )
    });

    assert_eq!(rejected.is_ok() as u8 + closed.is_ok() as u8, 1);
    let winner = if rejected.is_ok() {
        LeadStatus::Rejected
    } else {
        LeadStatus::Closed
    };
    let loser = rejected.err().or(closed.err()).expect("one update fails");
    assert!(matches!(
        loser,
        LeadRegistryError::InvalidTransition { from, .. } if from == winner
    ));
    assert_eq!(registry.get(&lead.id).expect("lead").status, winner);
}

#[test]
fn unknown_lead_reports_not_found() {
    let registry = registry();
    let missing = LeadId("LEAD-404".to_string());

    assert!(matches!(
        registry.days_remaining(&missing, t0()),
        Err(LeadRegistryError::NotFound(id)) if id == missing
    ));
}

#[test]
fn repository_outage_propagates() {
    let registry = LeadRegistry::new(Arc::new(UnavailableLeads));

    match registry.submit_lead(&broker_a(), submission(sedra(), "Abdullah", "0501234567"), 0.0, t0()) {
        Err(LeadRegistryError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository error, got {other:?}"),
    }
}

#[test]
fn broker_listing_is_most_recent_first_with_protection_bar() {
    let registry = registry();
    registry
        .submit_lead(&broker_a(), submission(sedra(), "First", "0500000001"), 0.0, t0())
        .expect("first");
    registry
        .submit_lead(&broker_a(), submission(sedra(), "Second", "0500000002"), 0.0, days_after(30))
        .expect("second");

    let views = registry
        .leads_for_broker(&broker_a(), days_after(30))
        .expect("listing succeeds");

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].client_name, "Second");
    assert_eq!(views[0].protection_percent, 100);
    assert_eq!(views[1].days_remaining, 30);
    assert_eq!(views[1].protection_percent, 50);

    let later = registry
        .leads_for_broker(&broker_a(), days_after(75))
        .expect("listing succeeds");
    assert!(later[1].expired);
    assert_eq!(later[1].status, "Expired");
    assert_eq!(later[1].protection_percent, 0);
}
