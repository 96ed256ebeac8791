//! Document lifecycle shared by financial documents (invoices, sales returns).
//!
//! Legal transitions: Draft → Submitted → Approved, and any non-cancelled
//! state → Cancelled. Cancelled is terminal. Only Draft documents may be
//! edited or deleted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{PlatformError, PlatformResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Submitted,
    Approved,
    Cancelled,
}

impl DocumentStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition(self, next: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted) | (Submitted, Approved) | (Draft, Cancelled) | (Submitted, Cancelled) | (Approved, Cancelled)
        )
    }

    /// Validate and perform a transition, rejecting illegal moves as
    /// Business errors.
    pub fn transition(self, next: DocumentStatus) -> PlatformResult<DocumentStatus> {
        if self.can_transition(next) {
            Ok(next)
        } else {
            Err(PlatformError::business(format!(
                "illegal status transition from '{self}' to '{next}'"
            )))
        }
    }

    /// Only Draft documents may be modified or deleted.
    pub fn is_editable(self) -> bool {
        self == DocumentStatus::Draft
    }

    pub fn is_terminal(self) -> bool {
        self == DocumentStatus::Cancelled
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Submitted => "submitted",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}
