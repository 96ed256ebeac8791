//! Unit of work: groups writes to several records into one atomic batch.
//!
//! The contract mirrors a database transaction:
//! - `begin` fails if a transaction is already open
//! - `register_*` stages writes; staging requires an open transaction
//! - `commit` submits the whole batch through [`DocumentStore::apply`];
//!   on failure nothing was applied, the staged writes are discarded, and
//!   the error is rethrown to the caller
//! - `rollback` discards the staged writes
//!
//! Atomicity itself is delegated to the store backend (lock-scoped
//! validate-then-apply in memory, a real transaction on PostgreSQL).

use std::sync::Arc;

use crate::core::entity::Entity;
use crate::core::error::{PlatformError, PlatformResult};
use crate::storage::{DocumentStore, WriteOp};

pub struct UnitOfWork {
    store: Arc<dyn DocumentStore>,
    staged: Vec<WriteOp>,
    open: bool,
}

impl UnitOfWork {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            staged: Vec::new(),
            open: false,
        }
    }

    /// Open the transaction. Fails if one is already open.
    pub fn begin(&mut self) -> PlatformResult<()> {
        if self.open {
            return Err(PlatformError::conflict("a transaction is already open"));
        }
        self.open = true;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Number of staged writes.
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    fn ensure_open(&self) -> PlatformResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(PlatformError::conflict("no open transaction"))
        }
    }

    /// Stage an insert.
    pub fn register_new<T: Entity>(&mut self, record: &T) -> PlatformResult<()> {
        self.ensure_open()?;
        self.staged.push(WriteOp::Insert(record.to_raw()?));
        Ok(())
    }

    /// Stage an update.
    pub fn register_dirty<T: Entity>(&mut self, record: &T) -> PlatformResult<()> {
        self.ensure_open()?;
        self.staged.push(WriteOp::Update(record.to_raw()?));
        Ok(())
    }

    /// Stage a hard delete.
    pub fn register_removed<T: Entity>(&mut self, record: &T) -> PlatformResult<()> {
        self.ensure_open()?;
        self.staged.push(WriteOp::Delete {
            tenant_id: record.tenant_id(),
            doc_type: T::doc_type().to_string(),
            id: record.id(),
        });
        Ok(())
    }

    /// Submit the staged batch atomically and close the transaction.
    ///
    /// On failure the batch was not applied; the staged writes are
    /// discarded and the error propagates.
    pub async fn commit(&mut self) -> PlatformResult<()> {
        self.ensure_open()?;
        let ops = std::mem::take(&mut self.staged);
        self.open = false;
        self.store.apply(ops).await
    }

    /// Discard the staged writes and close the transaction.
    pub fn rollback(&mut self) {
        self.staged.clear();
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_record;
    use crate::storage::InMemoryDocumentStore;
    use uuid::Uuid;

    impl_record!(
        Widget,
        "widget",
        "widgets",
        {
            label: String,
        }
    );

    fn setup() -> (Arc<InMemoryDocumentStore>, UnitOfWork) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let uow = UnitOfWork::new(store.clone());
        (store, uow)
    }

    #[test]
    fn begin_twice_is_a_conflict() {
        let (_, mut uow) = setup();
        uow.begin().unwrap();
        let err = uow.begin().unwrap_err();
        assert!(matches!(err, PlatformError::Conflict { .. }));
    }

    #[test]
    fn staging_without_begin_fails() {
        let (_, mut uow) = setup();
        let w = Widget::new(Uuid::new_v4(), "a".to_string());
        assert!(uow.register_new(&w).is_err());
    }

    #[tokio::test]
    async fn commit_without_begin_fails() {
        let (_, mut uow) = setup();
        assert!(uow.commit().await.is_err());
    }

    #[tokio::test]
    async fn commit_applies_all_staged_writes() {
        let (store, mut uow) = setup();
        let tenant = Uuid::new_v4();
        let a = Widget::new(tenant, "a".to_string());
        let b = Widget::new(tenant, "b".to_string());

        uow.begin().unwrap();
        uow.register_new(&a).unwrap();
        uow.register_new(&b).unwrap();
        assert_eq!(uow.pending(), 2);
        uow.commit().await.unwrap();

        assert!(!uow.is_open());
        assert_eq!(uow.pending(), 0);
        assert_eq!(store.list(tenant, "widget").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_commit_applies_nothing_and_rethrows() {
        let (store, mut uow) = setup();
        let tenant = Uuid::new_v4();
        let existing = Widget::new(tenant, "existing".to_string());
        store.insert(existing.to_raw().unwrap()).await.unwrap();

        let fresh = Widget::new(tenant, "fresh".to_string());
        uow.begin().unwrap();
        uow.register_new(&fresh).unwrap();
        // Duplicate insert makes the whole batch fail.
        uow.register_new(&existing).unwrap();

        let err = uow.commit().await.unwrap_err();
        assert!(matches!(err, PlatformError::Conflict { .. }));

        let rows = store.list(tenant, "widget").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, existing.id);

        // The transaction is closed and can be reopened.
        assert!(!uow.is_open());
        uow.begin().unwrap();
    }

    #[tokio::test]
    async fn rollback_discards_staged_writes() {
        let (store, mut uow) = setup();
        let tenant = Uuid::new_v4();
        let w = Widget::new(tenant, "ghost".to_string());

        uow.begin().unwrap();
        uow.register_new(&w).unwrap();
        uow.rollback();

        assert!(!uow.is_open());
        assert_eq!(uow.pending(), 0);
        assert!(store.list(tenant, "widget").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mixed_batch_updates_and_deletes() {
        let (store, mut uow) = setup();
        let tenant = Uuid::new_v4();
        let mut keep = Widget::new(tenant, "keep".to_string());
        let stale = Widget::new(tenant, "stale".to_string());
        store.insert(keep.to_raw().unwrap()).await.unwrap();
        store.insert(stale.to_raw().unwrap()).await.unwrap();

        keep.label = "kept".to_string();
        keep.touch();

        uow.begin().unwrap();
        uow.register_dirty(&keep).unwrap();
        uow.register_removed(&stale).unwrap();
        uow.commit().await.unwrap();

        let rows = store.list(tenant, "widget").await.unwrap();
        assert_eq!(rows.len(), 1);
        let restored = Widget::from_raw(&rows[0]).unwrap();
        assert_eq!(restored.label, "kept");
    }
}
