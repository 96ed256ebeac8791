//! Finance: invoices, checks, current accounts, and payments.

pub mod handlers;
pub mod model;

pub use model::{
    AccountKind, Check, CheckStatus, CurrentAccount, Invoice, InvoiceLine, Payment, PaymentMethod,
};
