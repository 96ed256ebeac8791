//! Administrative records.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::core::error::{PlatformError, PlatformResult};
use crate::impl_record;

// =============================================================================
// System error log
// =============================================================================

impl_record!(
    SystemError,
    "system_error",
    "system-errors",
    {
        source: String,
        message: String,
        detail: Option<String>,
        occurred_at: DateTime<Utc>,
        resolved: bool,
        resolved_at: Option<DateTime<Utc>>,
        resolved_by: Option<String>,
    }
);

impl SystemError {
    pub fn record(
        tenant_id: Uuid,
        source: String,
        message: String,
        detail: Option<String>,
    ) -> Self {
        Self::new(
            tenant_id,
            source,
            message,
            detail,
            Utc::now(),
            false,
            None,
            None,
        )
    }

    /// Mark the error resolved. Resolving twice is a conflict.
    pub fn resolve(&mut self, by: Option<String>) -> PlatformResult<()> {
        if self.resolved {
            return Err(PlatformError::conflict(format!(
                "system error '{}' is already resolved",
                self.id
            )));
        }
        self.resolved = true;
        self.resolved_at = Some(Utc::now());
        self.resolved_by = by;
        self.touch();
        Ok(())
    }
}

// =============================================================================
// General settings
// =============================================================================

impl_record!(
    GeneralSettings,
    "general_settings",
    "settings",
    {
        company_name: String,
        default_currency: String,
        locale: String,
        /// 1-based month the fiscal year starts in.
        fiscal_year_start_month: u32,
        /// Free-form key/value pairs; insertion order is preserved.
        custom: IndexMap<String, String>,
    }
);

impl GeneralSettings {
    /// Settings a fresh tenant starts from.
    pub fn defaults(tenant_id: Uuid) -> Self {
        Self::new(
            tenant_id,
            String::new(),
            "USD".to_string(),
            "en-US".to_string(),
            1,
            IndexMap::new(),
        )
    }
}
