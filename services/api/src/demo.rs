use crate::infra::{in_memory_affiliate_service, MemoryAffiliateService};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use nawafiz_affiliate::advisory::{
    AdvisoryProviders, ChatSession, Language, ValuationRequest,
};
use nawafiz_affiliate::affiliate::{
    BrokerId, CobrokingRequestId, ContactDisclosure, DealStage, DealTracker, GatedAction,
    LeadSubmission, ListingId,
};
use nawafiz_affiliate::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Scenario start (YYYY-MM-DD or RFC 3339). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) start: Option<DateTime<Utc>>,
    /// Answer advisory prompts in Arabic.
    #[arg(long)]
    pub(crate) arabic: bool,
    /// Skip the advisory portion of the demo.
    #[arg(long)]
    pub(crate) skip_advisory: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        start,
        arabic,
        skip_advisory,
    } = args;
    let t0 = start.unwrap_or_else(Utc::now);

    println!("Nawafiz affiliate demo (scenario start {})", t0.to_rfc3339());
    let service = in_memory_affiliate_service();
    lead_protection_walkthrough(&service, t0);
    disclosure_walkthrough(&service, t0);
    pipeline_walkthrough(t0);

    if skip_advisory {
        return Ok(());
    }
    let language = if arabic { Language::Ar } else { Language::En };
    advisory_walkthrough(language, t0).await
}

fn lead_protection_walkthrough(service: &MemoryAffiliateService, t0: DateTime<Utc>) {
    let broker_a = BrokerId("broker-a".to_string());
    let broker_b = BrokerId("broker-b".to_string());
    let sedra = ListingId("L101".to_string());
    let abdullah = || LeadSubmission {
        listing_id: sedra.clone(),
        client_name: "Abdullah".to_string(),
        client_phone: "0501234567".to_string(),
    };

    println!("\nLead protection");
    let early = service.register_lead(&broker_a, abdullah(), t0);
    match early {
        Ok(_) => println!("- Broker A registered a lead without a marketing contract"),
        Err(err) => println!("- Broker A before signing: {err}"),
    }

    for (broker, name) in [(&broker_a, "Broker A"), (&broker_b, "Broker B")] {
        match service.sign_marketing_contract(broker, name, &sedra, t0) {
            Ok(contract) => println!(
                "- {name} signed {} contract {} for {}",
                contract.contract_type.label(),
                contract.id,
                contract.reference_id
            ),
            Err(err) => println!("- {name} could not sign: {err}"),
        }
    }

    match service.register_lead(&broker_a, abdullah(), t0) {
        Ok(view) => println!(
            "- Broker A protected {} as {} ({} days, until {})",
            view.client_name, view.lead_id, view.days_remaining, view.expiry_date
        ),
        Err(err) => println!("- Broker A submission rejected: {err}"),
    }

    match service.register_lead(&broker_b, abdullah(), t0) {
        Ok(_) => println!("- Broker B unexpectedly registered the same client"),
        Err(err) => println!("- Broker B same day: {err}"),
    }

    let later = t0 + Duration::days(61);
    match service.register_lead(&broker_b, abdullah(), later) {
        Ok(view) => println!(
            "- Broker B after 61 days: protected as {} ({} days)",
            view.lead_id, view.days_remaining
        ),
        Err(err) => println!("- Broker B after 61 days: {err}"),
    }

    match service.leads_for_broker(&broker_a, later) {
        Ok(views) => {
            for view in views {
                println!(
                    "  Broker A vault: {} {} | {} | {}% protection left",
                    view.lead_id, view.client_name, view.status, view.protection_percent
                );
            }
        }
        Err(err) => println!("  Broker A vault unavailable: {err}"),
    }
}

fn disclosure_walkthrough(service: &MemoryAffiliateService, t0: DateTime<Utc>) {
    let broker_a = BrokerId("broker-a".to_string());
    let request_id = CobrokingRequestId("REQ-001".to_string());

    println!("\nCo-broking disclosure");
    let show = |label: &str| match service.counterparty_contact(&broker_a, &request_id) {
        Ok(ContactDisclosure::Revealed { name, phone, company }) => {
            println!("- {label}: {name} | {phone} | {company}")
        }
        Ok(ContactDisclosure::Masked { name, phone, guidance }) => {
            println!("- {label}: {name} | {phone} ({guidance})")
        }
        Err(err) => println!("- {label}: {err}"),
    };

    show("Before signing");
    let decision = service.decide(
        &broker_a,
        &GatedAction::RevealContact {
            request_id: request_id.clone(),
        },
        t0,
    );
    if let Ok(decision) = decision {
        println!("  Gate permits reveal: {}", decision.permitted);
    }

    match service.sign_co_broking_contract(&broker_a, "Broker A", &request_id, t0) {
        Ok(contract) => println!("- Signed non-circumvention contract {}", contract.id),
        Err(err) => println!("- Co-broking signature failed: {err}"),
    }
    show("After signing");

    if let Err(err) = service.sign_co_broking_contract(&broker_a, "Broker A", &request_id, t0) {
        println!("- Re-signing: {err}");
    }
}

fn pipeline_walkthrough(t0: DateTime<Utc>) {
    println!("\nDeal pipeline");
    let mut deal = DealTracker {
        id: "D-001".to_string(),
        lead_name: "Abdullah".to_string(),
        project_name: "Sedra 3".to_string(),
        deal_value: 1_200_000.0,
        commission_amount: 30_000.0,
        stage: DealStage::LeadProtected,
        last_updated: t0.date_naive(),
    };

    for (offset, stage) in DealStage::ORDERED.iter().skip(1).enumerate() {
        let on = (t0 + Duration::days(7 * (offset as i64 + 1))).date_naive();
        match deal.advance(*stage, on) {
            Ok(()) => println!(
                "- {} on {}: {}% | next: {}",
                stage.label(),
                on,
                deal.progress_percent(),
                deal.next_action()
            ),
            Err(err) => println!("- {err}"),
        }
    }
}

async fn advisory_walkthrough(language: Language, t0: DateTime<Utc>) -> Result<(), AppError> {
    println!("\nAdvisory (mock provider)");
    let providers = AdvisoryProviders::mock();

    let request = ValuationRequest {
        city: "Riyadh".to_string(),
        district: "Al Malqa".to_string(),
        area: 400.0,
        property_type: "Villa".to_string(),
        bedrooms: 5,
        age: 2,
        street_width: Some("20m".to_string()),
        direction: Some("North".to_string()),
        finishing: Some("Luxury".to_string()),
    };
    let valuation = providers.valuation.valuation(&request, language).await?;
    println!(
        "- Valuation: {:.0} - {:.0} SAR ({}% confidence, {:?} risk)",
        valuation.estimated_price.min,
        valuation.estimated_price.max,
        valuation.estimated_price.confidence,
        valuation.risk_level
    );
    println!("  {}", valuation.market_analysis);

    let chat = ChatSession::new(providers.chat.clone());
    let reply = chat
        .send("Is Al Malqa a good place to invest?", language, t0)
        .await?;
    println!("- Chat: {}", reply.text);

    Ok(())
}
