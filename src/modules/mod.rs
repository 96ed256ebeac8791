//! Business modules: finance, sales, CRM, HR, and the master admin area.

pub mod crm;
pub mod finance;
pub mod hr;
pub mod master;
pub mod sales;
