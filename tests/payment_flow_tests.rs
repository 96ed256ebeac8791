//! Payment registration: the payment row and the account balance move in
//! one transaction, guarded by the invoice status rule.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use common::{as_tenant, server};

async fn create_account(server: &axum_test::TestServer, tenant: Uuid) -> String {
    let account: Value = as_tenant(server.post("/api/finance/accounts"), tenant)
        .json(&json!({ "code": "ACC-01", "name": "Receivables", "kind": "customer" }))
        .await
        .json();
    account["id"].as_str().unwrap().to_string()
}

async fn create_invoice(server: &axum_test::TestServer, tenant: Uuid) -> String {
    let invoice: Value = as_tenant(server.post("/api/finance/invoices"), tenant)
        .json(&json!({
            "number": "INV-0001",
            "customer": "Acme",
            "currency": "EUR",
            "lines": [{ "description": "work", "quantity": 1, "unit_price": 100.0 }]
        }))
        .await
        .json();
    invoice["id"].as_str().unwrap().to_string()
}

async fn approve_invoice(server: &axum_test::TestServer, tenant: Uuid, id: &str) {
    as_tenant(server.post(&format!("/api/finance/invoices/{id}/submit")), tenant).await;
    as_tenant(
        server.post(&format!("/api/finance/invoices/{id}/approve")),
        tenant,
    )
    .await;
}

#[tokio::test]
async fn payment_credits_the_account() {
    let server = server();
    let tenant = Uuid::new_v4();
    let account_id = create_account(&server, tenant).await;
    let invoice_id = create_invoice(&server, tenant).await;
    approve_invoice(&server, tenant, &invoice_id).await;

    let res = as_tenant(server.post("/api/finance/payments"), tenant)
        .json(&json!({
            "number": "PAY-0001",
            "amount": 100.0,
            "method": "bank_transfer",
            "invoice_id": invoice_id,
            "account_id": account_id,
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);

    let account: Value = as_tenant(
        server.get(&format!("/api/finance/accounts/{account_id}")),
        tenant,
    )
    .await
    .json();
    assert_eq!(account["balance"], 100.0);

    let payments: Value = as_tenant(server.get("/api/finance/payments"), tenant)
        .await
        .json();
    assert_eq!(payments["count"], 1);
}

#[tokio::test]
async fn payment_against_a_draft_invoice_is_rejected_and_nothing_moves() {
    let server = server();
    let tenant = Uuid::new_v4();
    let account_id = create_account(&server, tenant).await;
    let invoice_id = create_invoice(&server, tenant).await;

    let res = as_tenant(server.post("/api/finance/payments"), tenant)
        .json(&json!({
            "number": "PAY-0002",
            "amount": 50.0,
            "method": "cash",
            "invoice_id": invoice_id,
            "account_id": account_id,
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = res.json();
    assert!(body["message"].as_str().unwrap().contains("approved"));

    // Neither side of the transaction happened.
    let account: Value = as_tenant(
        server.get(&format!("/api/finance/accounts/{account_id}")),
        tenant,
    )
    .await
    .json();
    assert_eq!(account["balance"], 0.0);

    let payments: Value = as_tenant(server.get("/api/finance/payments"), tenant)
        .await
        .json();
    assert_eq!(payments["count"], 0);
}

#[tokio::test]
async fn payment_to_a_missing_account_is_404() {
    let server = server();
    let tenant = Uuid::new_v4();

    let res = as_tenant(server.post("/api/finance/payments"), tenant)
        .json(&json!({
            "number": "PAY-0003",
            "amount": 10.0,
            "method": "card",
            "account_id": Uuid::new_v4(),
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn standalone_payment_without_invoice_is_accepted() {
    let server = server();
    let tenant = Uuid::new_v4();
    let account_id = create_account(&server, tenant).await;

    let res = as_tenant(server.post("/api/finance/payments"), tenant)
        .json(&json!({
            "number": "PAY-0004",
            "amount": 25.5,
            "method": "cash",
            "account_id": account_id,
        }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);

    let account: Value = as_tenant(
        server.get(&format!("/api/finance/accounts/{account_id}")),
        tenant,
    )
    .await
    .json();
    assert_eq!(account["balance"], 25.5);
}
