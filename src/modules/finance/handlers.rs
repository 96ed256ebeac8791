//! Finance HTTP handlers.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::model::{
    AccountKind, Check, CurrentAccount, Invoice, InvoiceLine, Payment, PaymentMethod,
};
use crate::core::error::{FieldIssue, PlatformError, PlatformResult, ValidationError};
use crate::core::status::DocumentStatus;
use crate::core::tenant::TenantContext;
use crate::core::validation::{self, RuleSet};
use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/{id}",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/invoices/{id}/submit", post(submit_invoice))
        .route("/invoices/{id}/approve", post(approve_invoice))
        .route("/invoices/{id}/cancel", post(cancel_invoice))
        .route("/checks", get(list_checks).post(create_check))
        .route("/checks/{id}", get(get_check))
        .route("/checks/{id}/clear", post(clear_check))
        .route("/checks/{id}/bounce", post(bounce_check))
        .route("/checks/{id}/cancel", post(cancel_check))
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{id}", get(get_account))
        .route("/payments", get(list_payments).post(register_payment))
        .route("/payments/{id}", get(get_payment))
}

// =============================================================================
// Invoices
// =============================================================================

#[derive(Debug, Deserialize)]
struct LineRequest {
    description: String,
    quantity: f64,
    unit_price: f64,
    #[serde(default)]
    tax_rate: f64,
}

impl LineRequest {
    fn into_line(self) -> InvoiceLine {
        InvoiceLine::new(self.description, self.quantity, self.unit_price, self.tax_rate)
    }
}

#[derive(Debug, Deserialize)]
struct CreateInvoice {
    number: String,
    customer: String,
    currency: String,
    #[serde(default)]
    lines: Vec<LineRequest>,
    due_date: Option<NaiveDate>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateInvoice {
    customer: Option<String>,
    currency: Option<String>,
    lines: Option<Vec<LineRequest>>,
    due_date: Option<NaiveDate>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvoiceQuery {
    number: Option<String>,
    customer: Option<String>,
}

fn invoice_rules() -> RuleSet {
    RuleSet::new()
        .rule("number", validation::required())
        .rule("number", validation::document_number())
        .rule("customer", validation::required())
        .rule("customer", validation::string_length(1, 200))
        .rule("currency", validation::required())
        .rule("currency", validation::string_length(3, 3))
}

fn check_lines(lines: &[LineRequest]) -> PlatformResult<()> {
    let mut issues = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if line.description.trim().is_empty() {
            issues.push(FieldIssue {
                field: format!("lines[{i}].description"),
                message: "must not be empty".to_string(),
            });
        }
        if line.quantity <= 0.0 {
            issues.push(FieldIssue {
                field: format!("lines[{i}].quantity"),
                message: "must be positive".to_string(),
            });
        }
        if line.unit_price < 0.0 {
            issues.push(FieldIssue {
                field: format!("lines[{i}].unit_price"),
                message: "must not be negative".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&line.tax_rate) {
            issues.push(FieldIssue {
                field: format!("lines[{i}].tax_rate"),
                message: "must be a fraction between 0 and 1".to_string(),
            });
        }
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Fields(issues).into())
    }
}

async fn list_invoices(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<InvoiceQuery>,
) -> PlatformResult<Json<Value>> {
    let repo = state.repo::<Invoice>();
    let invoices = if let Some(number) = &query.number {
        repo.search(ctx.tenant_id, "number", number).await?
    } else if let Some(customer) = &query.customer {
        repo.search(ctx.tenant_id, "customer", customer).await?
    } else {
        repo.list(ctx.tenant_id).await?
    };
    Ok(Json(json!({
        "invoices": invoices,
        "count": invoices.len(),
    })))
}

async fn get_invoice(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Invoice>> {
    state.repo::<Invoice>().get(ctx.tenant_id, id).await.map(Json)
}

async fn create_invoice(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<Value>,
) -> PlatformResult<(StatusCode, Json<Invoice>)> {
    invoice_rules().check(&payload)?;
    let request: CreateInvoice = serde_json::from_value(payload)?;
    check_lines(&request.lines)?;

    let repo = state.repo::<Invoice>();
    let duplicates = repo.search(ctx.tenant_id, "number", &request.number).await?;
    if !duplicates.is_empty() {
        return Err(PlatformError::conflict(format!(
            "invoice number '{}' is already in use",
            request.number
        )));
    }

    let invoice = Invoice::draft(
        ctx.tenant_id,
        request.number,
        request.customer,
        request.currency,
        request.lines.into_iter().map(LineRequest::into_line).collect(),
        request.due_date,
        request.notes,
    );
    repo.insert(&invoice).await?;
    tracing::info!(invoice = %invoice.number, total = invoice.total, "invoice created");
    Ok((StatusCode::CREATED, Json(invoice)))
}

async fn update_invoice(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> PlatformResult<Json<Invoice>> {
    RuleSet::new()
        .rule("customer", validation::string_length(1, 200))
        .rule("currency", validation::string_length(3, 3))
        .check(&payload)?;
    let request: UpdateInvoice = serde_json::from_value(payload)?;
    if let Some(lines) = &request.lines {
        check_lines(lines)?;
    }

    let repo = state.repo::<Invoice>();
    let mut invoice = repo.get(ctx.tenant_id, id).await?;
    invoice.ensure_editable()?;

    if let Some(customer) = request.customer {
        invoice.customer = customer;
    }
    if let Some(currency) = request.currency {
        invoice.currency = currency;
    }
    if let Some(due_date) = request.due_date {
        invoice.due_date = Some(due_date);
    }
    if let Some(notes) = request.notes {
        invoice.notes = Some(notes);
    }
    if let Some(lines) = request.lines {
        invoice.replace_lines(lines.into_iter().map(LineRequest::into_line).collect())?;
    } else {
        invoice.recompute_totals();
        invoice.touch();
    }

    repo.update(&invoice).await?;
    Ok(Json(invoice))
}

async fn delete_invoice(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<StatusCode> {
    let repo = state.repo::<Invoice>();
    let mut invoice = repo.get(ctx.tenant_id, id).await?;
    invoice.ensure_editable()?;
    invoice.soft_delete();
    repo.update(&invoice).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_invoice(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Invoice>> {
    transition_invoice(&state, &ctx, id, Invoice::submit).await
}

async fn approve_invoice(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Invoice>> {
    transition_invoice(&state, &ctx, id, Invoice::approve).await
}

async fn cancel_invoice(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Invoice>> {
    transition_invoice(&state, &ctx, id, Invoice::cancel).await
}

async fn transition_invoice(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    apply: fn(&mut Invoice) -> PlatformResult<()>,
) -> PlatformResult<Json<Invoice>> {
    let repo = state.repo::<Invoice>();
    let mut invoice = repo.get(ctx.tenant_id, id).await?;
    apply(&mut invoice)?;
    repo.update(&invoice).await?;
    tracing::info!(invoice = %invoice.number, status = %invoice.status, "invoice transitioned");
    Ok(Json(invoice))
}

// =============================================================================
// Checks
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateCheck {
    number: String,
    payee: String,
    amount: f64,
    bank: Option<String>,
    due_date: Option<NaiveDate>,
}

async fn list_checks(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> PlatformResult<Json<Value>> {
    let checks = state.repo::<Check>().list(ctx.tenant_id).await?;
    Ok(Json(json!({ "checks": checks, "count": checks.len() })))
}

async fn get_check(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Check>> {
    state.repo::<Check>().get(ctx.tenant_id, id).await.map(Json)
}

async fn create_check(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<Value>,
) -> PlatformResult<(StatusCode, Json<Check>)> {
    RuleSet::new()
        .rule("number", validation::required())
        .rule("number", validation::document_number())
        .rule("payee", validation::required())
        .rule("payee", validation::string_length(1, 200))
        .rule("amount", validation::required())
        .rule("amount", validation::positive())
        .check(&payload)?;
    let request: CreateCheck = serde_json::from_value(payload)?;

    let repo = state.repo::<Check>();
    let duplicates = repo.search(ctx.tenant_id, "number", &request.number).await?;
    if !duplicates.is_empty() {
        return Err(PlatformError::conflict(format!(
            "check number '{}' is already in use",
            request.number
        )));
    }

    let check = Check::issue(
        ctx.tenant_id,
        request.number,
        request.payee,
        request.amount,
        request.bank,
        request.due_date,
    );
    repo.insert(&check).await?;
    Ok((StatusCode::CREATED, Json(check)))
}

async fn clear_check(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Check>> {
    transition_check(&state, &ctx, id, Check::clear).await
}

async fn bounce_check(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Check>> {
    transition_check(&state, &ctx, id, Check::bounce).await
}

async fn cancel_check(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Check>> {
    transition_check(&state, &ctx, id, Check::cancel).await
}

async fn transition_check(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    apply: fn(&mut Check) -> PlatformResult<()>,
) -> PlatformResult<Json<Check>> {
    let repo = state.repo::<Check>();
    let mut check = repo.get(ctx.tenant_id, id).await?;
    apply(&mut check)?;
    repo.update(&check).await?;
    Ok(Json(check))
}

// =============================================================================
// Current accounts
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateAccount {
    code: String,
    name: String,
    kind: AccountKind,
}

async fn list_accounts(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> PlatformResult<Json<Value>> {
    let accounts = state.repo::<CurrentAccount>().list(ctx.tenant_id).await?;
    Ok(Json(json!({ "accounts": accounts, "count": accounts.len() })))
}

async fn get_account(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<CurrentAccount>> {
    state
        .repo::<CurrentAccount>()
        .get(ctx.tenant_id, id)
        .await
        .map(Json)
}

async fn create_account(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<Value>,
) -> PlatformResult<(StatusCode, Json<CurrentAccount>)> {
    RuleSet::new()
        .rule("code", validation::required())
        .rule("code", validation::string_length(2, 32))
        .rule("name", validation::required())
        .rule("name", validation::string_length(1, 200))
        .rule("kind", validation::required())
        .rule(
            "kind",
            validation::in_list(vec![
                "customer".to_string(),
                "vendor".to_string(),
                "bank".to_string(),
            ]),
        )
        .check(&payload)?;
    let request: CreateAccount = serde_json::from_value(payload)?;

    let repo = state.repo::<CurrentAccount>();
    let duplicates = repo.search(ctx.tenant_id, "code", &request.code).await?;
    if !duplicates.is_empty() {
        return Err(PlatformError::conflict(format!(
            "account code '{}' is already in use",
            request.code
        )));
    }

    let account = CurrentAccount::open(ctx.tenant_id, request.code, request.name, request.kind);
    repo.insert(&account).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Debug, Deserialize)]
struct RegisterPayment {
    number: String,
    amount: f64,
    method: PaymentMethod,
    invoice_id: Option<Uuid>,
    account_id: Uuid,
    received_on: Option<NaiveDate>,
    reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentQuery {
    number: Option<String>,
}

async fn list_payments(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<PaymentQuery>,
) -> PlatformResult<Json<Value>> {
    let repo = state.repo::<Payment>();
    let payments = if let Some(number) = &query.number {
        repo.search(ctx.tenant_id, "number", number).await?
    } else {
        repo.list(ctx.tenant_id).await?
    };
    Ok(Json(json!({ "payments": payments, "count": payments.len() })))
}

async fn get_payment(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Payment>> {
    state.repo::<Payment>().get(ctx.tenant_id, id).await.map(Json)
}

/// Register a payment: the payment row and the account balance move in
/// one transaction.
async fn register_payment(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<Value>,
) -> PlatformResult<(StatusCode, Json<Payment>)> {
    RuleSet::new()
        .rule("number", validation::required())
        .rule("number", validation::document_number())
        .rule("amount", validation::required())
        .rule("amount", validation::positive())
        .rule("method", validation::required())
        .rule(
            "method",
            validation::in_list(vec![
                "cash".to_string(),
                "card".to_string(),
                "bank_transfer".to_string(),
                "check".to_string(),
            ]),
        )
        .rule("account_id", validation::required())
        .check(&payload)?;
    let request: RegisterPayment = serde_json::from_value(payload)?;

    let mut account = state
        .repo::<CurrentAccount>()
        .get(ctx.tenant_id, request.account_id)
        .await?;

    if let Some(invoice_id) = request.invoice_id {
        let invoice = state.repo::<Invoice>().get(ctx.tenant_id, invoice_id).await?;
        if invoice.status != DocumentStatus::Approved {
            return Err(PlatformError::business(format!(
                "payments can only be registered against approved invoices (invoice '{}' is {})",
                invoice.number, invoice.status
            )));
        }
    }

    let payment = Payment::new(
        ctx.tenant_id,
        request.number,
        request.amount,
        request.method,
        request.invoice_id,
        request.account_id,
        request.received_on.unwrap_or_else(|| Utc::now().date_naive()),
        request.reference,
    );
    account.post_credit(request.amount)?;

    let mut uow = state.uow();
    uow.begin()?;
    uow.register_new(&payment)?;
    uow.register_dirty(&account)?;
    uow.commit().await?;

    tracing::info!(payment = %payment.number, amount = payment.amount, "payment registered");
    Ok((StatusCode::CREATED, Json(payment)))
}
