//! HTTP server assembly.

pub mod builder;

pub use builder::ServerBuilder;

use std::sync::Arc;

use crate::core::entity::Entity;
use crate::core::repository::Repository;
use crate::core::uow::UnitOfWork;
use crate::storage::DocumentStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Typed repository over the shared store.
    pub fn repo<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }

    /// Fresh unit of work for multi-record writes.
    pub fn uow(&self) -> UnitOfWork {
        UnitOfWork::new(self.store.clone())
    }
}
