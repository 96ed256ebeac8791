//! Shared helpers for the HTTP test suites.
#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use uuid::Uuid;

use meridian::server::ServerBuilder;
use meridian::storage::InMemoryDocumentStore;

/// A fresh server over an empty in-memory store.
pub fn server() -> TestServer {
    let app = ServerBuilder::new()
        .with_store(InMemoryDocumentStore::new())
        .build()
        .expect("router should build");
    TestServer::try_new(app).expect("test server should start")
}

/// Attach the tenant header to a request.
pub fn as_tenant(req: TestRequest, tenant: Uuid) -> TestRequest {
    req.add_header(
        HeaderName::from_static("x-tenant-id"),
        HeaderValue::from_str(&tenant.to_string()).expect("uuid is a valid header value"),
    )
}

/// Attach tenant + admin role headers to a request.
pub fn as_admin(req: TestRequest, tenant: Uuid) -> TestRequest {
    as_tenant(req, tenant).add_header(
        HeaderName::from_static("x-roles"),
        HeaderValue::from_static("admin"),
    )
}
