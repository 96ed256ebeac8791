//! Typed, tenant-scoped data access over the document store.

use std::marker::PhantomData;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::entity::{Entity, Searchable};
use crate::core::error::{PlatformError, PlatformResult, ValidationError};
use crate::storage::DocumentStore;

/// Per-entity facade: builds queries, converts raw documents, and enforces
/// the soft-delete filter. Repositories are stateless handles; constructing
/// one per request is free.
pub struct Repository<T: Entity> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Insert a new record.
    pub async fn insert(&self, record: &T) -> PlatformResult<()> {
        self.store.insert(record.to_raw()?).await
    }

    /// Fetch a record if it exists, including soft-deleted ones.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> PlatformResult<Option<T>> {
        match self.store.get(tenant_id, T::doc_type(), id).await? {
            Some(raw) => Ok(Some(T::from_raw(&raw)?)),
            None => Ok(None),
        }
    }

    /// Fetch a live record or fail with NotFound. Soft-deleted records are
    /// treated as missing.
    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> PlatformResult<T> {
        self.find(tenant_id, id)
            .await?
            .filter(|r| !r.is_deleted())
            .ok_or_else(|| PlatformError::not_found(T::doc_type(), id))
    }

    /// List live records for the tenant.
    pub async fn list(&self, tenant_id: Uuid) -> PlatformResult<Vec<T>> {
        let raws = self.store.list(tenant_id, T::doc_type()).await?;
        let mut records = Vec::with_capacity(raws.len());
        for raw in &raws {
            let record = T::from_raw(raw)?;
            if !record.is_deleted() {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Persist changes to an existing record.
    pub async fn update(&self, record: &T) -> PlatformResult<()> {
        self.store.update(record.to_raw()?).await
    }

    /// Hard-delete a record.
    pub async fn remove(&self, tenant_id: Uuid, id: Uuid) -> PlatformResult<()> {
        self.store.delete(tenant_id, T::doc_type(), id).await
    }
}

impl<T: Searchable> Repository<T> {
    /// Find live records whose indexed field equals `value`
    /// (case-insensitive).
    pub async fn search(
        &self,
        tenant_id: Uuid,
        field: &str,
        value: &str,
    ) -> PlatformResult<Vec<T>> {
        if !T::indexed_fields().contains(&field) {
            return Err(ValidationError::field(
                field,
                format!(
                    "not searchable; searchable fields are {:?}",
                    T::indexed_fields()
                ),
            )
            .into());
        }
        let records = self.list(tenant_id).await?;
        Ok(records
            .into_iter()
            .filter(|r| {
                r.search_value(field)
                    .is_some_and(|v| v.eq_ignore_ascii_case(value))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_record;
    use crate::storage::InMemoryDocumentStore;

    impl_record!(
        Gadget,
        "gadget",
        "gadgets",
        {
            code: String,
        }
    );

    impl Searchable for Gadget {
        fn indexed_fields() -> &'static [&'static str] {
            &["code"]
        }

        fn search_value(&self, field: &str) -> Option<String> {
            match field {
                "code" => Some(self.code.clone()),
                _ => None,
            }
        }
    }

    fn repo() -> Repository<Gadget> {
        Repository::new(Arc::new(InMemoryDocumentStore::new()))
    }

    #[tokio::test]
    async fn get_missing_record_is_not_found() {
        let repo = repo();
        let err = repo.get(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }

    #[tokio::test]
    async fn get_is_tenant_scoped() {
        let repo = repo();
        let g = Gadget::new(Uuid::new_v4(), "G-1".to_string());
        repo.insert(&g).await.unwrap();

        // Same id, different tenant: invisible.
        let err = repo.get(Uuid::new_v4(), g.id).await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));

        let found = repo.get(g.tenant_id, g.id).await.unwrap();
        assert_eq!(found.code, "G-1");
    }

    #[tokio::test]
    async fn list_excludes_soft_deleted() {
        let repo = repo();
        let tenant = Uuid::new_v4();
        let alive = Gadget::new(tenant, "alive".to_string());
        let mut gone = Gadget::new(tenant, "gone".to_string());
        repo.insert(&alive).await.unwrap();
        repo.insert(&gone).await.unwrap();

        gone.soft_delete();
        repo.update(&gone).await.unwrap();

        let listed = repo.list(tenant).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].code, "alive");

        // Soft-deleted records also 404 on direct fetch.
        let err = repo.get(tenant, gone.id).await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }

    #[tokio::test]
    async fn search_matches_case_insensitively() {
        let repo = repo();
        let tenant = Uuid::new_v4();
        repo.insert(&Gadget::new(tenant, "ABC-1".to_string()))
            .await
            .unwrap();
        repo.insert(&Gadget::new(tenant, "XYZ-2".to_string()))
            .await
            .unwrap();

        let hits = repo.search(tenant, "code", "abc-1").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "ABC-1");
    }

    #[tokio::test]
    async fn search_on_unknown_field_is_a_validation_error() {
        let repo = repo();
        let err = repo
            .search(Uuid::new_v4(), "colour", "blue")
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Validation(_)));
    }
}
