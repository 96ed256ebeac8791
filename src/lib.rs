//! # Meridian
//!
//! A multi-tenant business management platform API: finance, sales, CRM,
//! HR, and master administration served over REST/JSON.
//!
//! ## Architecture
//!
//! - **Records**: every business entity carries the same envelope (id,
//!   tenant, timestamps, soft-delete marker), generated by [`impl_record!`].
//! - **Tenancy**: requests name their tenant via the `X-Tenant-ID` header;
//!   storage is keyed by tenant, so cross-tenant reads are impossible by
//!   construction.
//! - **Transactions**: multi-record writes stage through a
//!   [`core::uow::UnitOfWork`] and land atomically in the store.
//! - **Lifecycles**: financial documents move Draft → Submitted → Approved
//!   (→ Cancelled) through guarded transitions; leads, checks, meetings and
//!   trainings carry their own small state machines.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use meridian::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_store(InMemoryDocumentStore::new())
//!     .build()?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod modules;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::entity::{Entity, Searchable};
    pub use crate::core::error::{PlatformError, PlatformResult, ValidationError};
    pub use crate::core::repository::Repository;
    pub use crate::core::status::DocumentStatus;
    pub use crate::core::tenant::{Policy, TenantContext};
    pub use crate::core::uow::UnitOfWork;

    // === Macros ===
    pub use crate::impl_record;

    // === Modules ===
    pub use crate::modules::crm::{Lead, LeadStage, Meeting, MeetingStatus, Territory};
    pub use crate::modules::finance::{
        AccountKind, Check, CheckStatus, CurrentAccount, Invoice, InvoiceLine, Payment,
        PaymentMethod,
    };
    pub use crate::modules::hr::{Training, TrainingStatus};
    pub use crate::modules::master::{GeneralSettings, SystemError};
    pub use crate::modules::sales::SalesReturn;

    // === Server & storage ===
    pub use crate::config::AppConfig;
    pub use crate::server::{AppState, ServerBuilder};
    pub use crate::storage::{DocumentStore, InMemoryDocumentStore};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
