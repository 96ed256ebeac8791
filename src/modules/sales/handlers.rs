//! Sales HTTP handlers.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::model::SalesReturn;
use crate::core::error::{PlatformError, PlatformResult};
use crate::core::status::DocumentStatus;
use crate::core::tenant::TenantContext;
use crate::core::validation::{self, RuleSet};
use crate::modules::finance::model::Invoice;
use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/returns", get(list_returns).post(create_return))
        .route(
            "/returns/{id}",
            get(get_return).put(update_return).delete(delete_return),
        )
        .route("/returns/{id}/submit", post(submit_return))
        .route("/returns/{id}/approve", post(approve_return))
        .route("/returns/{id}/cancel", post(cancel_return))
}

#[derive(Debug, Deserialize)]
struct CreateReturn {
    number: String,
    invoice_id: Uuid,
    reason: String,
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct UpdateReturn {
    reason: Option<String>,
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ReturnQuery {
    number: Option<String>,
}

fn return_rules() -> RuleSet {
    RuleSet::new()
        .rule("number", validation::required())
        .rule("number", validation::document_number())
        .rule("invoice_id", validation::required())
        .rule("reason", validation::required())
        .rule("reason", validation::string_length(1, 500))
        .rule("amount", validation::required())
        .rule("amount", validation::positive())
}

async fn list_returns(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ReturnQuery>,
) -> PlatformResult<Json<Value>> {
    let repo = state.repo::<SalesReturn>();
    let returns = if let Some(number) = &query.number {
        repo.search(ctx.tenant_id, "number", number).await?
    } else {
        repo.list(ctx.tenant_id).await?
    };
    Ok(Json(json!({ "returns": returns, "count": returns.len() })))
}

async fn get_return(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<SalesReturn>> {
    state
        .repo::<SalesReturn>()
        .get(ctx.tenant_id, id)
        .await
        .map(Json)
}

async fn create_return(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<Value>,
) -> PlatformResult<(StatusCode, Json<SalesReturn>)> {
    return_rules().check(&payload)?;
    let request: CreateReturn = serde_json::from_value(payload)?;

    // The referenced invoice must exist under the same tenant.
    let invoice = state
        .repo::<Invoice>()
        .get(ctx.tenant_id, request.invoice_id)
        .await?;
    if request.amount > invoice.total {
        return Err(PlatformError::business(format!(
            "return amount {} exceeds invoice total {}",
            request.amount, invoice.total
        )));
    }

    let ret = SalesReturn::draft(
        ctx.tenant_id,
        request.number,
        request.invoice_id,
        request.reason,
        request.amount,
    );
    state.repo::<SalesReturn>().insert(&ret).await?;
    Ok((StatusCode::CREATED, Json(ret)))
}

async fn update_return(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> PlatformResult<Json<SalesReturn>> {
    RuleSet::new()
        .rule("reason", validation::string_length(1, 500))
        .rule("amount", validation::positive())
        .check(&payload)?;
    let request: UpdateReturn = serde_json::from_value(payload)?;

    let repo = state.repo::<SalesReturn>();
    let mut ret = repo.get(ctx.tenant_id, id).await?;
    ret.ensure_editable()?;

    if let Some(reason) = request.reason {
        ret.reason = reason;
    }
    if let Some(amount) = request.amount {
        ret.amount = crate::modules::finance::model::round2(amount);
    }
    ret.touch();
    repo.update(&ret).await?;
    Ok(Json(ret))
}

async fn delete_return(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<StatusCode> {
    let repo = state.repo::<SalesReturn>();
    let mut ret = repo.get(ctx.tenant_id, id).await?;
    ret.ensure_editable()?;
    ret.soft_delete();
    repo.update(&ret).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_return(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<SalesReturn>> {
    let repo = state.repo::<SalesReturn>();
    let mut ret = repo.get(ctx.tenant_id, id).await?;
    ret.submit()?;
    repo.update(&ret).await?;
    Ok(Json(ret))
}

/// Approving a return requires the underlying invoice to be approved.
async fn approve_return(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<SalesReturn>> {
    let repo = state.repo::<SalesReturn>();
    let mut ret = repo.get(ctx.tenant_id, id).await?;

    let invoice = state
        .repo::<Invoice>()
        .get(ctx.tenant_id, ret.invoice_id)
        .await?;
    if invoice.status != DocumentStatus::Approved {
        return Err(PlatformError::business(format!(
            "cannot approve a return against invoice '{}' while it is {}",
            invoice.number, invoice.status
        )));
    }

    ret.approve()?;
    repo.update(&ret).await?;
    tracing::info!(sales_return = %ret.number, "sales return approved");
    Ok(Json(ret))
}

async fn cancel_return(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<SalesReturn>> {
    let repo = state.repo::<SalesReturn>();
    let mut ret = repo.get(ctx.tenant_id, id).await?;
    ret.cancel()?;
    repo.update(&ret).await?;
    Ok(Json(ret))
}
