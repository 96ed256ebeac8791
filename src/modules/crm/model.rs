//! CRM records and stage machines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::core::entity::Searchable;
use crate::core::error::{PlatformError, PlatformResult};
use crate::impl_record;

// =============================================================================
// Lead
// =============================================================================

/// Sales pipeline stage. Won and Lost are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStage {
    New,
    Contacted,
    Qualified,
    Won,
    Lost,
}

impl LeadStage {
    pub fn can_advance(self, next: LeadStage) -> bool {
        use LeadStage::*;
        matches!(
            (self, next),
            (New, Contacted) | (Contacted, Qualified) | (Contacted, Lost) | (Qualified, Won) | (Qualified, Lost)
        )
    }
}

impl fmt::Display for LeadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LeadStage::New => "new",
            LeadStage::Contacted => "contacted",
            LeadStage::Qualified => "qualified",
            LeadStage::Won => "won",
            LeadStage::Lost => "lost",
        };
        write!(f, "{s}")
    }
}

impl_record!(
    Lead,
    "lead",
    "leads",
    {
        contact_name: String,
        company: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        territory_id: Option<Uuid>,
        stage: LeadStage,
    }
);

impl Lead {
    pub fn capture(
        tenant_id: Uuid,
        contact_name: String,
        company: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        territory_id: Option<Uuid>,
    ) -> Self {
        Self::new(
            tenant_id,
            contact_name,
            company,
            email,
            phone,
            territory_id,
            LeadStage::New,
        )
    }

    pub fn advance(&mut self, next: LeadStage) -> PlatformResult<()> {
        if !self.stage.can_advance(next) {
            return Err(PlatformError::business(format!(
                "lead cannot move from '{}' to '{next}'",
                self.stage
            )));
        }
        self.stage = next;
        self.touch();
        Ok(())
    }
}

impl Searchable for Lead {
    fn indexed_fields() -> &'static [&'static str] {
        &["contact_name", "company"]
    }

    fn search_value(&self, field: &str) -> Option<String> {
        match field {
            "contact_name" => Some(self.contact_name.clone()),
            "company" => self.company.clone(),
            _ => None,
        }
    }
}

// =============================================================================
// Territory
// =============================================================================

impl_record!(
    Territory,
    "territory",
    "territories",
    {
        code: String,
        name: String,
        region: Option<String>,
        manager: Option<String>,
    }
);

impl Searchable for Territory {
    fn indexed_fields() -> &'static [&'static str] {
        &["code", "name"]
    }

    fn search_value(&self, field: &str) -> Option<String> {
        match field {
            "code" => Some(self.code.clone()),
            "name" => Some(self.name.clone()),
            _ => None,
        }
    }
}

// =============================================================================
// Meeting
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Scheduled,
    Held,
    Cancelled,
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MeetingStatus::Scheduled => "scheduled",
            MeetingStatus::Held => "held",
            MeetingStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl_record!(
    Meeting,
    "meeting",
    "meetings",
    {
        subject: String,
        lead_id: Option<Uuid>,
        scheduled_at: DateTime<Utc>,
        duration_minutes: u32,
        location: Option<String>,
        status: MeetingStatus,
    }
);

impl Meeting {
    pub fn schedule(
        tenant_id: Uuid,
        subject: String,
        lead_id: Option<Uuid>,
        scheduled_at: DateTime<Utc>,
        duration_minutes: u32,
        location: Option<String>,
    ) -> Self {
        Self::new(
            tenant_id,
            subject,
            lead_id,
            scheduled_at,
            duration_minutes,
            location,
            MeetingStatus::Scheduled,
        )
    }

    fn close(&mut self, next: MeetingStatus) -> PlatformResult<()> {
        if self.status != MeetingStatus::Scheduled {
            return Err(PlatformError::business(format!(
                "meeting '{}' is already {}",
                self.subject, self.status
            )));
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    pub fn hold(&mut self) -> PlatformResult<()> {
        self.close(MeetingStatus::Held)
    }

    pub fn cancel(&mut self) -> PlatformResult<()> {
        self.close(MeetingStatus::Cancelled)
    }
}
