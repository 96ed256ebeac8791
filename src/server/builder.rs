//! Fluent builder producing the complete API router.

use axum::Router;
use axum::response::Json;
use axum::routing::get;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::modules::{crm, finance, hr, master, sales};
use crate::server::AppState;
use crate::storage::DocumentStore;

/// Builder for the HTTP application.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryDocumentStore::new())
///     .build()?;
/// axum::serve(listener, app).await?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    cors: bool,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            cors: true,
        }
    }

    /// Set the document store (required).
    pub fn with_store(mut self, store: impl DocumentStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an already-shared document store.
    pub fn with_shared_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Disable the permissive CORS layer (it is on by default for the
    /// browser front-ends).
    pub fn without_cors(mut self) -> Self {
        self.cors = false;
        self
    }

    /// Build the router with every module mounted under `/api`.
    pub fn build(self) -> anyhow::Result<Router> {
        let store = self
            .store
            .ok_or_else(|| anyhow::anyhow!("a document store is required. Call .with_store()"))?;
        let state = AppState::new(store);

        let api = Router::new()
            .nest("/finance", finance::handlers::routes())
            .nest("/sales", sales::handlers::routes())
            .nest("/crm", crm::handlers::routes())
            .nest("/hr", hr::handlers::routes())
            .nest("/master", master::handlers::routes());

        let mut app = Router::new()
            .route("/health", get(health))
            .nest("/api", api)
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        if self.cors {
            app = app.layer(CorsLayer::permissive());
        }

        Ok(app)
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDocumentStore;

    #[test]
    fn build_requires_a_store() {
        let err = ServerBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("document store"));
    }

    #[test]
    fn build_with_memory_store_succeeds() {
        ServerBuilder::new()
            .with_store(InMemoryDocumentStore::new())
            .build()
            .expect("router should build");
    }
}
