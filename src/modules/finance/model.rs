//! Finance records and their state machines.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::core::entity::Searchable;
use crate::core::error::{PlatformError, PlatformResult};
use crate::core::status::DocumentStatus;
use crate::impl_record;

/// Round to cents. Applied at every computation point so stored amounts
/// never accumulate representation drift.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Invoice
// =============================================================================

/// One line of an invoice. Lines are embedded in their invoice document
/// and never stored separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: Uuid,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Fractional tax rate, e.g. 0.2 for 20%.
    pub tax_rate: f64,
    /// Derived; recomputed whenever the lines change.
    pub line_total: f64,
}

impl InvoiceLine {
    pub fn new(description: String, quantity: f64, unit_price: f64, tax_rate: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            description,
            quantity,
            unit_price,
            tax_rate,
            line_total: round2(quantity * unit_price),
        }
    }
}

impl_record!(
    Invoice,
    "invoice",
    "invoices",
    {
        number: String,
        customer: String,
        currency: String,
        status: DocumentStatus,
        lines: Vec<InvoiceLine>,
        subtotal: f64,
        tax_total: f64,
        total: f64,
        due_date: Option<NaiveDate>,
        notes: Option<String>,
    }
);

impl Invoice {
    /// Create a new Draft invoice with derived totals.
    #[allow(clippy::too_many_arguments)]
    pub fn draft(
        tenant_id: Uuid,
        number: String,
        customer: String,
        currency: String,
        lines: Vec<InvoiceLine>,
        due_date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> Self {
        let mut invoice = Self::new(
            tenant_id,
            number,
            customer,
            currency,
            DocumentStatus::Draft,
            lines,
            0.0,
            0.0,
            0.0,
            due_date,
            notes,
        );
        invoice.recompute_totals();
        invoice
    }

    /// Recompute every line total, the subtotal, the tax total and the
    /// grand total from the current lines.
    pub fn recompute_totals(&mut self) {
        let mut subtotal = 0.0;
        let mut tax_total = 0.0;
        for line in &mut self.lines {
            line.line_total = round2(line.quantity * line.unit_price);
            subtotal += line.line_total;
            tax_total += line.line_total * line.tax_rate;
        }
        self.subtotal = round2(subtotal);
        self.tax_total = round2(tax_total);
        self.total = round2(self.subtotal + self.tax_total);
    }

    /// Only Draft invoices may be modified or deleted.
    pub fn ensure_editable(&self) -> PlatformResult<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(PlatformError::business(format!(
                "invoice '{}' is {} and can no longer be modified",
                self.number, self.status
            )))
        }
    }

    /// Replace the lines and rederive the totals.
    pub fn replace_lines(&mut self, lines: Vec<InvoiceLine>) -> PlatformResult<()> {
        self.ensure_editable()?;
        self.lines = lines;
        self.recompute_totals();
        self.touch();
        Ok(())
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

impl Searchable for Invoice {
    fn indexed_fields() -> &'static [&'static str] {
        &["number", "customer"]
    }

    fn search_value(&self, field: &str) -> Option<String> {
        match field {
            "number" => Some(self.number.clone()),
            "customer" => Some(self.customer.clone()),
            _ => None,
        }
    }
}

// =============================================================================
// Check
// =============================================================================

/// Lifecycle of an issued check. Pending checks either clear, bounce, or
/// get cancelled; all three outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pending,
    Cleared,
    Bounced,
    Cancelled,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckStatus::Pending => "pending",
            CheckStatus::Cleared => "cleared",
            CheckStatus::Bounced => "bounced",
            CheckStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl_record!(
    Check,
    "check",
    "checks",
    {
        number: String,
        payee: String,
        amount: f64,
        bank: Option<String>,
        due_date: Option<NaiveDate>,
        status: CheckStatus,
    }
);

impl Check {
    pub fn issue(
        tenant_id: Uuid,
        number: String,
        payee: String,
        amount: f64,
        bank: Option<String>,
        due_date: Option<NaiveDate>,
    ) -> Self {
        Self::new(
            tenant_id,
            number,
            payee,
            round2(amount),
            bank,
            due_date,
            CheckStatus::Pending,
        )
    }

    fn settle(&mut self, next: CheckStatus) -> PlatformResult<()> {
        if self.status != CheckStatus::Pending {
            return Err(PlatformError::business(format!(
                "check '{}' is already {}",
                self.number, self.status
            )));
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    pub fn clear(&mut self) -> PlatformResult<()> {
        self.settle(CheckStatus::Cleared)
    }

    pub fn bounce(&mut self) -> PlatformResult<()> {
        self.settle(CheckStatus::Bounced)
    }

    pub fn cancel(&mut self) -> PlatformResult<()> {
        self.settle(CheckStatus::Cancelled)
    }
}

impl Searchable for Check {
    fn indexed_fields() -> &'static [&'static str] {
        &["number", "payee"]
    }

    fn search_value(&self, field: &str) -> Option<String> {
        match field {
            "number" => Some(self.number.clone()),
            "payee" => Some(self.payee.clone()),
            _ => None,
        }
    }
}

// =============================================================================
// Current account
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Customer,
    Vendor,
    Bank,
}

impl_record!(
    CurrentAccount,
    "current_account",
    "accounts",
    {
        code: String,
        name: String,
        kind: AccountKind,
        balance: f64,
    }
);

impl CurrentAccount {
    pub fn open(tenant_id: Uuid, code: String, name: String, kind: AccountKind) -> Self {
        Self::new(tenant_id, code, name, kind, 0.0)
    }

    /// Increase the balance. Amounts must be positive; direction is carried
    /// by choosing credit vs. debit.
    pub fn post_credit(&mut self, amount: f64) -> PlatformResult<()> {
        self.post(amount, 1.0)
    }

    /// Decrease the balance.
    pub fn post_debit(&mut self, amount: f64) -> PlatformResult<()> {
        self.post(amount, -1.0)
    }

    fn post(&mut self, amount: f64, sign: f64) -> PlatformResult<()> {
        if amount <= 0.0 {
            return Err(PlatformError::business(format!(
                "posting amounts must be positive (got {amount})"
            )));
        }
        self.balance = round2(self.balance + sign * amount);
        self.touch();
        Ok(())
    }
}

impl Searchable for CurrentAccount {
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
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Check,
}

impl_record!(
    Payment,
    "payment",
    "payments",
    {
        number: String,
        amount: f64,
        method: PaymentMethod,
        invoice_id: Option<Uuid>,
        account_id: Uuid,
        received_on: NaiveDate,
        reference: Option<String>,
    }
);

impl Searchable for Payment {
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

// =============================================================================
// Tests
// =============================================================================
