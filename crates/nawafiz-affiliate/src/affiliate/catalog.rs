use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{CobrokingRequestId, ListingId};

/// Developer project offered to affiliate brokers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub developer_id: String,
    pub developer_name: String,
    pub title: String,
    pub location: String,
    /// Percentage of the sale price paid to the broker, e.g. `2.5`.
    pub commission_rate: f64,
}

impl Listing {
    /// Heuristic shown on the lead card; not a payout figure.
    pub fn potential_commission(&self) -> f64 {
        self.commission_rate * 30_000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CobrokingKind {
    #[serde(rename = "Have Buyer")]
    HaveBuyer,
    #[serde(rename = "Have Property")]
    HaveProperty,
}

/// Broker who posted a co-broking request. Contact fields are gated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CobrokingPoster {
    pub broker_id: String,
    pub name: String,
    pub phone: String,
    pub company: String,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CobrokingRequest {
    pub id: CobrokingRequestId,
    pub kind: CobrokingKind,
    pub title: String,
    pub location: String,
    pub commission_split: String,
    pub posted_by: CobrokingPoster,
}

/// Read-only reference data supplied by the listings catalog.
pub trait ListingCatalog: Send + Sync {
    fn listing(&self, id: &ListingId) -> Option<Listing>;
    fn cobroking_request(&self, id: &CobrokingRequestId) -> Option<CobrokingRequest>;
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    listings: BTreeMap<ListingId, Listing>,
    requests: BTreeMap<CobrokingRequestId, CobrokingRequest>,
}

impl StaticCatalog {
    pub fn new(listings: Vec<Listing>, requests: Vec<CobrokingRequest>) -> Self {
        Self {
            listings: listings
                .into_iter()
                .map(|listing| (listing.id.clone(), listing))
                .collect(),
            requests: requests
                .into_iter()
                .map(|request| (request.id.clone(), request))
                .collect(),
        }
    }

    /// Demo inventory used by the affiliate network screens.
    pub fn seeded() -> Self {
        let listing = |id: &str, developer_id: &str, developer: &str, title: &str, location: &str, rate: f64| {
            Listing {
                id: ListingId(id.to_string()),
                developer_id: developer_id.to_string(),
                developer_name: developer.to_string(),
                title: title.to_string(),
                location: location.to_string(),
                commission_rate: rate,
            }
        };

        let listings = vec![
            listing("L101", "DEV01", "Roshn", "Sedra Phase 2 - Type A Villa", "North Riyadh", 2.5),
            listing("L102", "DEV02", "Retal", "Ewan Al Maali Apartments", "Khobar", 2.0),
            listing("L103", "DEV03", "Ajdan", "Infiniti Tower Office", "Khobar Corniche", 3.0),
        ];

        let requests = vec![
            CobrokingRequest {
                id: CobrokingRequestId("REQ-001".to_string()),
                kind: CobrokingKind::HaveBuyer,
                title: "Serious Buyer for North Riyadh Villa".to_string(),
                location: "Al Malqa / Hittin".to_string(),
                commission_split: "50/50".to_string(),
                posted_by: CobrokingPoster {
                    broker_id: "BROKER-A".to_string(),
                    name: "Khalid Al-Otaibi".to_string(),
                    phone: "0501239876".to_string(),
                    company: "Elite Homes".to_string(),
                    verified: true,
                },
            },
            CobrokingRequest {
                id: CobrokingRequestId("REQ-002".to_string()),
                kind: CobrokingKind::HaveProperty,
                title: "Exclusive Commercial Land Plot".to_string(),
                location: "Jeddah, Obhur".to_string(),
                commission_split: "40/60".to_string(),
                posted_by: CobrokingPoster {
                    broker_id: "BROKER-B".to_string(),
                    name: "Fahad Real Estate".to_string(),
                    phone: "0559876543".to_string(),
                    company: "Fahad Co".to_string(),
                    verified: true,
                },
            },
        ];

        Self::new(listings, requests)
    }
}

impl ListingCatalog for StaticCatalog {
    fn listing(&self, id: &ListingId) -> Option<Listing> {
        self.listings.get(id).cloned()
    }

    fn cobroking_request(&self, id: &CobrokingRequestId) -> Option<CobrokingRequest> {
        self.requests.get(id).cloned()
    }
}
