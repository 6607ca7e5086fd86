use super::common::*;

use crate::affiliate::domain::{ContractType, LeadStatus, ListingId};
use crate::affiliate::gate::{ContactDisclosure, DisclosureGate, GateDenial, GatedAction};
use crate::affiliate::pipeline::DealStage;

#[test]
fn start_marketing_is_always_permitted() {
    let (service, _, _) = build_service();
    let decision = service
        .gate()
        .decide(
            &broker_a(),
            &GatedAction::StartMarketing {
                listing_id: ewan(),
            },
            t0(),
        )
        .expect("decision");
    assert!(decision.permitted);
    assert!(decision.guidance.is_none());
}

#[test]
fn add_lead_tracks_marketing_contract_exactly() {
    let (service, _, _) = build_service();
    let listings = [sedra(), ewan(), ListingId("L103".to_string())];

    let check = |service: &MemoryService| {
        for listing_id in &listings {
            for broker in [broker_a(), broker_b()] {
                let gate = service.gate();
                let expected = service
                    .contracts()
                    .has_active_contract(&broker, ContractType::Marketing, &listing_id.0)
                    .expect("lookup");
                assert_eq!(gate.can_add_lead(&broker, listing_id).expect("gate"), expected);
                let decision = gate
                    .decide(
                        &broker,
                        &GatedAction::AddLead {
                            listing_id: listing_id.clone(),
                        },
                        t0(),
                    )
                    .expect("decision");
                assert_eq!(decision.permitted, expected);
            }
        }
    };

    check(&service);
    service
        .sign_marketing_contract(&broker_a(), "Broker A", &ewan(), t0())
        .expect("signs");
    check(&service);
    service
        .sign_co_broking_contract(&broker_b(), "Broker B", &buyer_request(), t0())
        .expect("signs");
    check(&service);
    service
        .sign_marketing_contract(&broker_b(), "Broker B", &sedra(), t0())
        .expect("signs");
    check(&service);
}

#[test]
fn decisions_are_repeatable() {
    let service = marketing_service(&broker_a(), &ewan());
    let gate = service.gate();
    let action = GatedAction::AddLead {
        listing_id: ewan(),
    };

    let first = gate.decide(&broker_a(), &action, t0()).expect("decision");
    let second = gate.decide(&broker_a(), &action, t0()).expect("decision");
    assert_eq!(first, second);
    assert!(service
        .leads_for_broker(&broker_a(), t0())
        .expect("list")
        .is_empty());
}

#[test]
fn contact_is_masked_until_co_broking_signed() {
    let (service, _, _) = build_service();
    let request = buyer_request();

    match service
        .counterparty_contact(&broker_a(), &request)
        .expect("disclosure")
    {
        ContactDisclosure::Masked {
            name,
            phone,
            guidance,
        } => {
            assert_eq!(name, "Khalid Al-Otaibi");
            assert!(!phone.contains("1239876"));
            assert!(guidance.contains("REQ-001"));
        }
        other => panic!("expected masked contact, got {other:?}"),
    }

    service
        .sign_co_broking_contract(&broker_a(), "Broker A", &request, t0())
        .expect("signs");

    assert_eq!(
        service
            .counterparty_contact(&broker_a(), &request)
            .expect("disclosure"),
        ContactDisclosure::Revealed {
            name: "Khalid Al-Otaibi".to_string(),
            phone: "0501239876".to_string(),
            company: "Elite Homes".to_string(),
        }
    );
    assert!(matches!(
        service
            .counterparty_contact(&broker_b(), &request)
            .expect("disclosure"),
        ContactDisclosure::Masked { .. }
    ));
}

#[test]
fn brokerage_requires_own_protected_open_lead() {
    let service = marketing_service(&broker_a(), &sedra());
    let lead = service
        .register_lead(&broker_a(), submission(sedra(), "Abdullah", "0501234567"), t0())
        .expect("lead registers");
    let gate = service.gate();

    assert!(gate
        .can_generate_brokerage_contract(&broker_a(), &sedra(), "050 123 4567", t0())
        .expect("gate"));
    assert!(!gate
        .can_generate_brokerage_contract(&broker_b(), &sedra(), "0501234567", t0())
        .expect("gate"));
    assert!(!gate
        .can_generate_brokerage_contract(&broker_a(), &sedra(), "0501234567", days_after(60))
        .expect("gate"));

    let decision = gate
        .decide(
            &broker_b(),
            &GatedAction::GenerateBrokerageContract {
                listing_id: sedra(),
                client_phone: "0501234567".to_string(),
            },
            t0(),
        )
        .expect("decision");
    assert_eq!(
        decision.denial,
        Some(GateDenial::ProtectedLeadRequired {
            listing_id: sedra()
        })
    );

    for status in [LeadStatus::Contacted, LeadStatus::Negotiation, LeadStatus::Rejected] {
        service
            .advance_lead_status(&broker_a(), &lead.lead_id, status, t0())
            .expect("status advances");
    }
    assert!(!service
        .gate()
        .can_generate_brokerage_contract(&broker_a(), &sedra(), "0501234567", t0())
        .expect("gate"));
}

#[test]
fn pipeline_helpers_expose_stage_math() {
    type Gate<'a> = DisclosureGate<
        'a,
        crate::affiliate::InMemoryLeadRepository,
        crate::affiliate::InMemoryContractRepository,
    >;

    assert_eq!(Gate::pipeline_progress_percent(DealStage::SpaSigned), 50);
    assert!(Gate::next_allowed_stages(DealStage::CommissionReleased).is_empty());
    assert_eq!(
        Gate::next_allowed_stages(DealStage::DeveloperVerified),
        vec![DealStage::CommissionReleased]
    );
}
