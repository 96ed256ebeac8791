//! HR: training sessions with capacity-bounded enrollment.

pub mod handlers;
pub mod model;

pub use model::{Training, TrainingStatus};
