//! CRM: leads, territories, and meetings.

pub mod handlers;
pub mod model;

pub use model::{Lead, LeadStage, Meeting, MeetingStatus, Territory};
