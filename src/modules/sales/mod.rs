//! Sales: return documents raised against invoices.

pub mod handlers;
pub mod model;

pub use model::SalesReturn;
