use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Milestones a protected deal passes through on its way to payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DealStage {
    #[serde(rename = "Lead_Protected")]
    LeadProtected,
    #[serde(rename = "SPA_Signed")]
    SpaSigned,
    #[serde(rename = "Developer_Verified")]
    DeveloperVerified,
    #[serde(rename = "Commission_Released")]
    CommissionReleased,
}

impl DealStage {
    pub const ORDERED: [DealStage; 4] = [
        DealStage::LeadProtected,
        DealStage::SpaSigned,
        DealStage::DeveloperVerified,
        DealStage::CommissionReleased,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            DealStage::LeadProtected => "Lead_Protected",
            DealStage::SpaSigned => "SPA_Signed",
            DealStage::DeveloperVerified => "Developer_Verified",
            DealStage::CommissionReleased => "Commission_Released",
        }
    }

    pub const fn progress_percent(self) -> u8 {
        match self {
            DealStage::LeadProtected => 25,
            DealStage::SpaSigned => 50,
            DealStage::DeveloperVerified => 75,
            DealStage::CommissionReleased => 100,
        }
    }

    pub const fn next(self) -> Option<DealStage> {
        match self {
            DealStage::LeadProtected => Some(DealStage::SpaSigned),
            DealStage::SpaSigned => Some(DealStage::DeveloperVerified),
            DealStage::DeveloperVerified => Some(DealStage::CommissionReleased),
            DealStage::CommissionReleased => None,
        }
    }

    /// Stages reachable from `self`; empty once the commission is released.
    pub fn next_allowed(self) -> Vec<DealStage> {
        self.next().into_iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("deal cannot move from {} to {}", from.label(), to.label())]
pub struct StageTransitionError {
    pub from: DealStage,
    pub to: DealStage,
}

/// Commission tracker for a deal sourced from a protected lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealTracker {
    pub id: String,
    pub lead_name: String,
    pub project_name: String,
    pub deal_value: f64,
    pub commission_amount: f64,
    pub stage: DealStage,
    pub last_updated: NaiveDate,
}

impl DealTracker {
    pub fn progress_percent(&self) -> u8 {
        self.stage.progress_percent()
    }

    pub fn advance(&mut self, to: DealStage, on: NaiveDate) -> Result<(), StageTransitionError> {
        if !self.stage.next_allowed().contains(&to) {
            return Err(StageTransitionError {
                from: self.stage,
                to,
            });
        }
        self.stage = to;
        self.last_updated = on;
        Ok(())
    }

    pub fn next_action(&self) -> &'static str {
        match self.stage {
            DealStage::LeadProtected => "Awaiting SPA signature",
            DealStage::SpaSigned => "Developer verification pending",
            DealStage::DeveloperVerified => "Commission release pending",
            DealStage::CommissionReleased => "Ready for payout",
        }
    }
}
