//! In-memory document store for development and tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::{PlatformError, PlatformResult};
use crate::storage::{DocumentStore, RawDocument, WriteOp};

type DocKey = (Uuid, String, Uuid);

/// Thread-safe in-memory backend keyed by (tenant, type, id).
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    docs: Arc<RwLock<HashMap<DocKey, RawDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_lock(
        &self,
    ) -> PlatformResult<std::sync::RwLockReadGuard<'_, HashMap<DocKey, RawDocument>>> {
        self.docs
            .read()
            .map_err(|e| PlatformError::infrastructure(format!("failed to acquire read lock: {e}")))
    }

    fn write_lock(
        &self,
    ) -> PlatformResult<std::sync::RwLockWriteGuard<'_, HashMap<DocKey, RawDocument>>> {
        self.docs.write().map_err(|e| {
            PlatformError::infrastructure(format!("failed to acquire write lock: {e}"))
        })
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(
        &self,
        tenant_id: Uuid,
        doc_type: &str,
        id: Uuid,
    ) -> PlatformResult<Option<RawDocument>> {
        let docs = self.read_lock()?;
        Ok(docs.get(&(tenant_id, doc_type.to_string(), id)).cloned())
    }

    async fn list(&self, tenant_id: Uuid, doc_type: &str) -> PlatformResult<Vec<RawDocument>> {
        let docs = self.read_lock()?;
        let mut rows: Vec<RawDocument> = docs
            .values()
            .filter(|d| d.tenant_id == tenant_id && d.doc_type == doc_type)
            .cloned()
            .collect();
        rows.sort_by_key(|d| d.created_at);
        Ok(rows)
    }

    async fn apply(&self, ops: Vec<WriteOp>) -> PlatformResult<()> {
        let mut docs = self.write_lock()?;

        // Validate the whole batch before touching anything, so a failing
        // operation leaves no partial state behind.
        for op in &ops {
            let (tenant_id, doc_type, id) = op.key();
            let key = (tenant_id, doc_type.to_string(), id);
            match op {
                WriteOp::Insert(_) => {
                    if docs.contains_key(&key) {
                        return Err(PlatformError::conflict(format!(
                            "{doc_type} with id '{id}' already exists"
                        )));
                    }
                }
                WriteOp::Update(_) | WriteOp::Delete { .. } => {
                    if !docs.contains_key(&key) {
                        return Err(PlatformError::not_found(doc_type, id));
                    }
                }
            }
        }

        for op in ops {
            let (tenant_id, doc_type, id) = op.key();
            let key = (tenant_id, doc_type.to_string(), id);
            match op {
                WriteOp::Insert(doc) | WriteOp::Update(doc) => {
                    docs.insert(key, doc);
                }
                WriteOp::Delete { .. } => {
                    docs.remove(&key);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn doc(tenant_id: Uuid, doc_type: &str, id: Uuid) -> RawDocument {
        let now = Utc::now();
        RawDocument {
            id,
            tenant_id,
            doc_type: doc_type.to_string(),
            body: json!({ "id": id.to_string() }),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn insert_then_get_roundtrip() {
        let store = InMemoryDocumentStore::new();
        let tenant = Uuid::new_v4();
        let id = Uuid::new_v4();

        store.insert(doc(tenant, "invoice", id)).await.unwrap();

        let found = store.get(tenant, "invoice", id).await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().id, id);
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let store = InMemoryDocumentStore::new();
        let tenant = Uuid::new_v4();
        let id = Uuid::new_v4();

        store.insert(doc(tenant, "invoice", id)).await.unwrap();
        let err = store.insert(doc(tenant, "invoice", id)).await.unwrap_err();
        assert!(matches!(err, PlatformError::Conflict { .. }));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = store
            .update(doc(Uuid::new_v4(), "check", Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_is_scoped_to_tenant_and_type() {
        let store = InMemoryDocumentStore::new();
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();

        store
            .insert(doc(tenant_a, "invoice", Uuid::new_v4()))
            .await
            .unwrap();
        store
            .insert(doc(tenant_a, "check", Uuid::new_v4()))
            .await
            .unwrap();
        store
            .insert(doc(tenant_b, "invoice", Uuid::new_v4()))
            .await
            .unwrap();

        let invoices_a = store.list(tenant_a, "invoice").await.unwrap();
        assert_eq!(invoices_a.len(), 1);
        let invoices_b = store.list(tenant_b, "invoice").await.unwrap();
        assert_eq!(invoices_b.len(), 1);
        assert_ne!(invoices_a[0].id, invoices_b[0].id);
    }

    #[tokio::test]
    async fn same_id_under_two_tenants_does_not_collide() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();
        store
            .insert(doc(Uuid::new_v4(), "invoice", id))
            .await
            .unwrap();
        store
            .insert(doc(Uuid::new_v4(), "invoice", id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failing_batch_applies_nothing() {
        let store = InMemoryDocumentStore::new();
        let tenant = Uuid::new_v4();
        let existing = Uuid::new_v4();
        store.insert(doc(tenant, "invoice", existing)).await.unwrap();

        let fresh = Uuid::new_v4();
        let ops = vec![
            WriteOp::Insert(doc(tenant, "payment", fresh)),
            // Second op collides, so the first must not land either.
            WriteOp::Insert(doc(tenant, "invoice", existing)),
        ];
        let err = store.apply(ops).await.unwrap_err();
        assert!(matches!(err, PlatformError::Conflict { .. }));

        assert!(store.get(tenant, "payment", fresh).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let store = InMemoryDocumentStore::new();
        let tenant = Uuid::new_v4();
        let id = Uuid::new_v4();
        store.insert(doc(tenant, "lead", id)).await.unwrap();

        store.delete(tenant, "lead", id).await.unwrap();
        assert!(store.get(tenant, "lead", id).await.unwrap().is_none());

        let err = store.delete(tenant, "lead", id).await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }
}
