//! HR records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::core::entity::Searchable;
use crate::core::error::{PlatformError, PlatformResult};
use crate::impl_record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    Planned,
    Completed,
    Cancelled,
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrainingStatus::Planned => "planned",
            TrainingStatus::Completed => "completed",
            TrainingStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl_record!(
    Training,
    "training",
    "trainings",
    {
        title: String,
        trainer: Option<String>,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        capacity: u32,
        enrolled: u32,
        status: TrainingStatus,
    }
);

impl Training {
    pub fn plan(
        tenant_id: Uuid,
        title: String,
        trainer: Option<String>,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        capacity: u32,
    ) -> Self {
        Self::new(
            tenant_id,
            title,
            trainer,
            starts_on,
            ends_on,
            capacity,
            0,
            TrainingStatus::Planned,
        )
    }

    /// Enroll one participant. Enrollment stops at capacity and closes
    /// entirely once the session leaves the Planned state.
    pub fn enroll(&mut self) -> PlatformResult<()> {
        if self.status != TrainingStatus::Planned {
            return Err(PlatformError::business(format!(
                "training '{}' is {} and no longer accepts enrollment",
                self.title, self.status
            )));
        }
        if self.enrolled >= self.capacity {
            return Err(PlatformError::business(format!(
                "training '{}' is full ({} seats)",
                self.title, self.capacity
            )));
        }
        self.enrolled += 1;
        self.touch();
        Ok(())
    }

    fn finish(&mut self, next: TrainingStatus) -> PlatformResult<()> {
        if self.status != TrainingStatus::Planned {
            return Err(PlatformError::business(format!(
                "training '{}' is already {}",
                self.title, self.status
            )));
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    pub fn complete(&mut self) -> PlatformResult<()> {
        self.finish(TrainingStatus::Completed)
    }

    pub fn cancel(&mut self) -> PlatformResult<()> {
        self.finish(TrainingStatus::Cancelled)
    }
}

impl Searchable for Training {
    fn indexed_fields() -> &'static [&'static str] {
        &["title"]
    }

    fn search_value(&self, field: &str) -> Option<String> {
        match field {
            "title" => Some(self.title.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planned(capacity: u32) -> Training {
        Training::plan(
            Uuid::new_v4(),
            "Rust for accountants".to_string(),
            Some("M. Keller".to_string()),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 3).unwrap(),
            capacity,
        )
    }

    #[test]
    fn enrollment_stops_at_capacity() {
        let mut training = planned(2);
        training.enroll().unwrap();
        training.enroll().unwrap();

        let err = training.enroll().unwrap_err();
        assert!(matches!(err, PlatformError::Business { .. }));
        assert!(err.to_string().contains("full"));
        assert_eq!(training.enrolled, 2);
    }

    #[test]
    fn completed_sessions_reject_enrollment() {
        let mut training = planned(10);
        training.complete().unwrap();
        assert!(training.enroll().is_err());
    }

    #[test]
    fn sessions_finish_once() {
        let mut training = planned(10);
        training.cancel().unwrap();
        assert!(training.complete().is_err());
    }
}
