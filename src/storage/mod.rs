//! Storage backends for the platform.
//!
//! Records are stored type-erased as [`RawDocument`]s: the common columns
//! (id, tenant, type, timestamps) plus the fully serialized body. Typed
//! access lives one level up in [`crate::core::repository`].
//!
//! All writes go through [`DocumentStore::apply`], which is atomic per
//! batch: either every staged operation lands or none do. The unit of work
//! builds on that guarantee.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::InMemoryDocumentStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresDocumentStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::core::error::PlatformResult;

/// A record flattened for storage.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub doc_type: String,
    pub body: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A staged write operation.
#[derive(Debug, Clone)]
pub enum WriteOp {
    Insert(RawDocument),
    Update(RawDocument),
    Delete {
        tenant_id: Uuid,
        doc_type: String,
        id: Uuid,
    },
}

impl WriteOp {
    /// The (tenant, type, id) key this operation touches.
    pub fn key(&self) -> (Uuid, &str, Uuid) {
        match self {
            WriteOp::Insert(doc) | WriteOp::Update(doc) => {
                (doc.tenant_id, doc.doc_type.as_str(), doc.id)
            }
            WriteOp::Delete {
                tenant_id,
                doc_type,
                id,
            } => (*tenant_id, doc_type.as_str(), *id),
        }
    }
}

/// Pluggable document store.
///
/// Every method is scoped by tenant: a store never returns or touches rows
/// belonging to another tenant than the one named in the call.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document, soft-deleted or not.
    async fn get(
        &self,
        tenant_id: Uuid,
        doc_type: &str,
        id: Uuid,
    ) -> PlatformResult<Option<RawDocument>>;

    /// List every document of one type for one tenant, including
    /// soft-deleted rows. Filtering those out is the repository's job.
    async fn list(&self, tenant_id: Uuid, doc_type: &str) -> PlatformResult<Vec<RawDocument>>;

    /// Apply a batch of writes atomically.
    ///
    /// Inserting an existing key is a Conflict; updating or deleting a
    /// missing key is NotFound. On any failure no operation from the batch
    /// is applied.
    async fn apply(&self, ops: Vec<WriteOp>) -> PlatformResult<()>;

    /// Insert a single document.
    async fn insert(&self, doc: RawDocument) -> PlatformResult<()> {
        self.apply(vec![WriteOp::Insert(doc)]).await
    }

    /// Update a single document.
    async fn update(&self, doc: RawDocument) -> PlatformResult<()> {
        self.apply(vec![WriteOp::Update(doc)]).await
    }

    /// Hard-delete a single document.
    async fn delete(&self, tenant_id: Uuid, doc_type: &str, id: Uuid) -> PlatformResult<()> {
        self.apply(vec![WriteOp::Delete {
            tenant_id,
            doc_type: doc_type.to_string(),
            id,
        }])
        .await
    }
}
