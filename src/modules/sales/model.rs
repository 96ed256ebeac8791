//! Sales return records.

use uuid::Uuid;

use crate::core::entity::Searchable;
use crate::core::error::{PlatformError, PlatformResult};
use crate::core::status::DocumentStatus;
use crate::impl_record;
use crate::modules::finance::model::round2;

impl_record!(
    SalesReturn,
    "sales_return",
    "sales-returns",
    {
        number: String,
        invoice_id: Uuid,
        reason: String,
        amount: f64,
        status: DocumentStatus,
    }
);

impl SalesReturn {
    pub fn draft(
        tenant_id: Uuid,
        number: String,
        invoice_id: Uuid,
        reason: String,
        amount: f64,
    ) -> Self {
        Self::new(
            tenant_id,
            number,
            invoice_id,
            reason,
            round2(amount),
            DocumentStatus::Draft,
        )
    }

    pub fn ensure_editable(&self) -> PlatformResult<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(PlatformError::business(format!(
                "sales return '{}' is {} and can no longer be modified",
                self.number, self.status
            )))
        }
    }

    pub fn submit(&mut self) -> PlatformResult<()> {
        self.status = self.status.transition(DocumentStatus::Submitted)?;
        self.touch();
        Ok(())
    }

    pub fn approve(&mut self) -> PlatformResult<()> {
        self.status = self.status.transition(DocumentStatus::Approved)?;
        self.touch();
        Ok(())
    }

    pub fn cancel(&mut self) -> PlatformResult<()> {
        self.status = self.status.transition(DocumentStatus::Cancelled)?;
        self.touch();
        Ok(())
    }
}

impl Searchable for SalesReturn {
    fn indexed_fields() -> &'static [&'static str] {
        &["number"]
    }

    fn search_value(&self, field: &str) -> Option<String> {
        match field {
            "number" => Some(self.number.clone()),
            _ => None,
        }
    }
}
