//! Record traits shared by every business entity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::core::error::{PlatformError, PlatformResult};
use crate::storage::RawDocument;

/// Base trait for every stored record.
///
/// All records carry:
/// - id: unique identifier
/// - tenant_id: owning tenant, used for row isolation
/// - created_at / updated_at: managed timestamps
/// - deleted_at: soft deletion marker
///
/// Records round-trip through [`RawDocument`] for storage; the serialized
/// body is the full record, with the common columns duplicated alongside
/// for querying.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Storage type name (singular, e.g. "invoice").
    fn doc_type() -> &'static str;

    /// Resource name used in URLs and messages (plural, e.g. "invoices").
    fn resource_name() -> &'static str;

    fn id(&self) -> Uuid;

    fn tenant_id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }

    /// Flatten for storage.
    fn to_raw(&self) -> PlatformResult<RawDocument> {
        let body = serde_json::to_value(self).map_err(|e| {
            PlatformError::infrastructure(format!(
                "failed to serialize {} '{}': {e}",
                Self::doc_type(),
                self.id()
            ))
        })?;
        Ok(RawDocument {
            id: self.id(),
            tenant_id: self.tenant_id(),
            doc_type: Self::doc_type().to_string(),
            body,
            created_at: self.created_at(),
            updated_at: self.updated_at(),
            deleted_at: self.deleted_at(),
        })
    }

    /// Rehydrate from storage. A body that no longer deserializes is a
    /// storage-level failure, not a caller mistake.
    fn from_raw(raw: &RawDocument) -> PlatformResult<Self> {
        serde_json::from_value(raw.body.clone()).map_err(|e| {
            PlatformError::infrastructure(format!(
                "corrupt {} document '{}': {e}",
                Self::doc_type(),
                raw.id
            ))
        })
    }
}

/// Records that can be looked up by field value.
pub trait Searchable: Entity {
    /// Fields accepted by `Repository::search`.
    fn indexed_fields() -> &'static [&'static str];

    /// The comparable value of one indexed field.
    fn search_value(&self, field: &str) -> Option<String>;
}
