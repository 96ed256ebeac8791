//! PostgreSQL document store using sqlx.
//!
//! Documents live in a single `documents` table: common columns plus a
//! JSONB `body`, with `(tenant_id, doc_type, id)` as the primary key so
//! tenant scoping is enforced by every lookup.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! meridian = { version = "0.3", features = ["postgres"] }
//! ```

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};
use uuid::Uuid;

use crate::core::error::{PlatformError, PlatformResult};
use crate::storage::{DocumentStore, RawDocument, WriteOp};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (\
    id UUID NOT NULL, \
    tenant_id UUID NOT NULL, \
    doc_type TEXT NOT NULL, \
    body JSONB NOT NULL, \
    created_at TIMESTAMPTZ NOT NULL, \
    updated_at TIMESTAMPTZ NOT NULL, \
    deleted_at TIMESTAMPTZ, \
    PRIMARY KEY (tenant_id, doc_type, id))";

/// Document store backed by a PostgreSQL connection pool.
#[derive(Clone, Debug)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the given database URL and ensure the schema exists.
    pub async fn connect(url: &str) -> PlatformResult<Self> {
        let pool = PgPool::connect(url).await.map_err(sql_err)?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Create the `documents` table if it is missing.
    pub async fn migrate(&self) -> PlatformResult<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(sql_err)?;
        Ok(())
    }
}

fn sql_err(err: sqlx::Error) -> PlatformError {
    PlatformError::infrastructure(format!("postgres error: {err}"))
}

fn row_to_doc(row: &PgRow) -> PlatformResult<RawDocument> {
    Ok(RawDocument {
        id: row.try_get("id").map_err(sql_err)?,
        tenant_id: row.try_get("tenant_id").map_err(sql_err)?,
        doc_type: row.try_get("doc_type").map_err(sql_err)?,
        body: row.try_get("body").map_err(sql_err)?,
        created_at: row.try_get("created_at").map_err(sql_err)?,
        updated_at: row.try_get("updated_at").map_err(sql_err)?,
        deleted_at: row.try_get("deleted_at").map_err(sql_err)?,
    })
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(
        &self,
        tenant_id: Uuid,
        doc_type: &str,
        id: Uuid,
    ) -> PlatformResult<Option<RawDocument>> {
        let row = sqlx::query(
            "SELECT id, tenant_id, doc_type, body, created_at, updated_at, deleted_at \
             FROM documents WHERE tenant_id = $1 AND doc_type = $2 AND id = $3",
        )
        .bind(tenant_id)
        .bind(doc_type)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(sql_err)?;

        row.as_ref().map(row_to_doc).transpose()
    }

    async fn list(&self, tenant_id: Uuid, doc_type: &str) -> PlatformResult<Vec<RawDocument>> {
        let rows = sqlx::query(
            "SELECT id, tenant_id, doc_type, body, created_at, updated_at, deleted_at \
             FROM documents WHERE tenant_id = $1 AND doc_type = $2 ORDER BY created_at",
        )
        .bind(tenant_id)
        .bind(doc_type)
        .fetch_all(&self.pool)
        .await
        .map_err(sql_err)?;

        rows.iter().map(row_to_doc).collect()
    }

    async fn apply(&self, ops: Vec<WriteOp>) -> PlatformResult<()> {
        let mut tx = self.pool.begin().await.map_err(sql_err)?;

        // Any error before commit drops the transaction, rolling everything
        // back on the server side.
        for op in ops {
            match op {
                WriteOp::Insert(doc) => {
                    let result = sqlx::query(
                        "INSERT INTO documents \
                         (id, tenant_id, doc_type, body, created_at, updated_at, deleted_at) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7)",
                    )
                    .bind(doc.id)
                    .bind(doc.tenant_id)
                    .bind(&doc.doc_type)
                    .bind(&doc.body)
                    .bind(doc.created_at)
                    .bind(doc.updated_at)
                    .bind(doc.deleted_at)
                    .execute(&mut *tx)
                    .await;

                    if let Err(err) = result {
                        let unique = err
                            .as_database_error()
                            .is_some_and(|d| d.is_unique_violation());
                        return Err(if unique {
                            PlatformError::conflict(format!(
                                "{} with id '{}' already exists",
                                doc.doc_type, doc.id
                            ))
                        } else {
                            sql_err(err)
                        });
                    }
                }
                WriteOp::Update(doc) => {
                    let result = sqlx::query(
                        "UPDATE documents SET body = $4, updated_at = $5, deleted_at = $6 \
                         WHERE tenant_id = $1 AND doc_type = $2 AND id = $3",
                    )
                    .bind(doc.tenant_id)
                    .bind(&doc.doc_type)
                    .bind(doc.id)
                    .bind(&doc.body)
                    .bind(doc.updated_at)
                    .bind(doc.deleted_at)
                    .execute(&mut *tx)
                    .await
                    .map_err(sql_err)?;

                    if result.rows_affected() == 0 {
                        return Err(PlatformError::not_found(doc.doc_type, doc.id));
                    }
                }
                WriteOp::Delete {
                    tenant_id,
                    doc_type,
                    id,
                } => {
                    let result = sqlx::query(
                        "DELETE FROM documents \
                         WHERE tenant_id = $1 AND doc_type = $2 AND id = $3",
                    )
                    .bind(tenant_id)
                    .bind(&doc_type)
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(sql_err)?;

                    if result.rows_affected() == 0 {
                        return Err(PlatformError::not_found(doc_type, id));
                    }
                }
            }
        }

        tx.commit().await.map_err(sql_err)
    }
}
