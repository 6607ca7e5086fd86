use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of the exclusivity window granted to the broker that registers a lead.
pub const PROTECTION_WINDOW_DAYS: i64 = 60;

/// Terms revision stamped on contracts signed through the platform.
pub const DEFAULT_TERMS_VERSION: &str = "v1.0";

/// Identifier wrapper for platform brokers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokerId(pub String);

/// Identifier wrapper for developer listings offered to the affiliate network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

/// Identifier wrapper for broker-to-broker co-broking requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CobrokingRequestId(pub String);

/// Identifier wrapper for registered leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

/// Identifier wrapper for signed contracts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub String);

macro_rules! display_id {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

display_id!(BrokerId, ListingId, CobrokingRequestId, LeadId, ContractId);

/// Normalized client phone: digits only, no other canonicalization.
///
/// `+966 50 123 4567` and `0501234567` stay distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientPhone(String);

impl ClientPhone {
    pub fn normalize(raw: &str) -> Self {
        Self(raw.chars().filter(char::is_ascii_digit).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ClientPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sales status a broker reports for a registered lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    Contacted,
    Negotiation,
    Closed,
    Rejected,
}

impl LeadStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Negotiation => "Negotiation",
            LeadStatus::Closed => "Closed",
            LeadStatus::Rejected => "Rejected",
        }
    }

    /// Single forward steps along `New -> Contacted -> Negotiation`, which
    /// ends in either `Closed` or `Rejected`.
    pub fn can_advance_to(self, next: LeadStatus) -> bool {
        matches!(
            (self, next),
            (LeadStatus::New, LeadStatus::Contacted)
                | (LeadStatus::Contacted, LeadStatus::Negotiation)
                | (LeadStatus::Negotiation, LeadStatus::Closed)
                | (LeadStatus::Negotiation, LeadStatus::Rejected)
        )
    }
}

/// Client registration that locks the client to a broker for one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub broker_id: BrokerId,
    pub listing_id: ListingId,
    pub client_name: String,
    pub client_phone: ClientPhone,
    pub submitted_at: DateTime<Utc>,
    pub expiry_at: DateTime<Utc>,
    pub status: LeadStatus,
    pub potential_commission: f64,
}

impl Lead {
    pub fn protection_window() -> Duration {
        Duration::days(PROTECTION_WINDOW_DAYS)
    }

    pub fn is_protected(&self, now: DateTime<Utc>) -> bool {
        now < self.expiry_at
    }

    /// Whole days left in the protection window, rounded up and never negative.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;
        let remaining = (self.expiry_at - now).num_milliseconds();
        if remaining <= 0 {
            0
        } else {
            (remaining + DAY_MILLIS - 1) / DAY_MILLIS
        }
    }

    pub fn matches_client(&self, listing_id: &ListingId, phone: &ClientPhone) -> bool {
        &self.listing_id == listing_id && &self.client_phone == phone
    }
}

/// Agreement families recognised by the affiliate network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    /// Developer to broker: right to market a listing and register leads.
    Marketing,
    /// Broker to broker: non-circumvention for a co-broking request.
    CoBroking,
    /// Broker to buyer: brokerage agreement for a protected client.
    Brokerage,
}

impl ContractType {
    pub const fn label(self) -> &'static str {
        match self {
            ContractType::Marketing => "MARKETING",
            ContractType::CoBroking => "CO_BROKING",
            ContractType::Brokerage => "BROKERAGE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Draft,
    Active,
    Expired,
    Terminated,
}

impl ContractStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ContractStatus::Draft => "DRAFT",
            ContractStatus::Active => "ACTIVE",
            ContractStatus::Expired => "EXPIRED",
            ContractStatus::Terminated => "TERMINATED",
        }
    }
}

/// Signed agreement held in the contract ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub contract_type: ContractType,
    pub status: ContractStatus,
    pub broker_id: BrokerId,
    /// Listing id, co-broking request id or lead id depending on `contract_type`.
    pub reference_id: String,
    pub party_a: String,
    pub party_b: String,
    pub signed_at: DateTime<Utc>,
    pub terms_version: String,
}

impl Contract {
    pub fn is_active_for(
        &self,
        broker_id: &BrokerId,
        contract_type: ContractType,
        reference_id: &str,
    ) -> bool {
        self.status == ContractStatus::Active
            && self.contract_type == contract_type
            && &self.broker_id == broker_id
            && self.reference_id == reference_id
    }
}

/// Fields a broker supplies when registering a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub listing_id: ListingId,
    pub client_name: String,
    pub client_phone: String,
}

/// Fields needed to sign a contract against a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub contract_type: ContractType,
    pub reference_id: String,
    pub party_a: String,
    pub party_b: String,
    pub terms_version: String,
}
