//! Master administration: system error log and tenant-wide settings.

pub mod handlers;
pub mod model;

pub use model::{GeneralSettings, SystemError};
