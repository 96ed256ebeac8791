//! Master administration HTTP handlers.
//!
//! All routes here require the `admin` role.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, put};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::model::{GeneralSettings, SystemError};
use crate::core::error::{PlatformError, PlatformResult};
use crate::core::tenant::{Policy, TenantContext};
use crate::core::validation::{self, RuleSet};
use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/system-management/errors",
            get(list_system_errors).post(record_system_error),
        )
        .route("/system-management/errors/{id}", get(get_system_error))
        .route(
            "/system-management/errors/{id}/resolve",
            put(resolve_system_error),
        )
        .route(
            "/settings/general",
            get(get_general_settings).put(update_general_settings),
        )
}

fn admin(ctx: &TenantContext) -> PlatformResult<()> {
    Policy::admin_only().authorize(ctx)
}

// =============================================================================
// System error log
// =============================================================================

#[derive(Debug, Deserialize)]
struct RecordSystemError {
    source: String,
    message: String,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResolveRequest {
    resolved_by: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorQuery {
    resolved: Option<bool>,
}

async fn list_system_errors(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ErrorQuery>,
) -> PlatformResult<Json<Value>> {
    admin(&ctx)?;
    let mut errors = state.repo::<SystemError>().list(ctx.tenant_id).await?;
    if let Some(resolved) = query.resolved {
        errors.retain(|e| e.resolved == resolved);
    }
    errors.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    Ok(Json(json!({ "errors": errors, "count": errors.len() })))
}

async fn get_system_error(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<SystemError>> {
    admin(&ctx)?;
    state
        .repo::<SystemError>()
        .get(ctx.tenant_id, id)
        .await
        .map(Json)
}

async fn record_system_error(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<Value>,
) -> PlatformResult<(StatusCode, Json<SystemError>)> {
    admin(&ctx)?;
    RuleSet::new()
        .rule("source", validation::required())
        .rule("source", validation::string_length(1, 200))
        .rule("message", validation::required())
        .rule("message", validation::string_length(1, 2000))
        .check(&payload)?;
    let request: RecordSystemError = serde_json::from_value(payload)?;

    let error = SystemError::record(ctx.tenant_id, request.source, request.message, request.detail);
    state.repo::<SystemError>().insert(&error).await?;
    Ok((StatusCode::CREATED, Json(error)))
}

async fn resolve_system_error(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    body: Option<Json<ResolveRequest>>,
) -> PlatformResult<Json<SystemError>> {
    admin(&ctx)?;
    let repo = state.repo::<SystemError>();
    let mut error = repo.get(ctx.tenant_id, id).await?;

    let resolved_by = body
        .and_then(|Json(r)| r.resolved_by)
        .or_else(|| ctx.user_id.map(|u| u.to_string()));
    error.resolve(resolved_by)?;
    repo.update(&error).await?;
    tracing::info!(error_id = %error.id, "system error resolved");
    Ok(Json(error))
}

// =============================================================================
// General settings
// =============================================================================

#[derive(Debug, Deserialize)]
struct UpdateSettings {
    company_name: Option<String>,
    default_currency: Option<String>,
    locale: Option<String>,
    fiscal_year_start_month: Option<u32>,
    custom: Option<IndexMap<String, String>>,
}

async fn load_settings(state: &AppState, tenant_id: Uuid) -> PlatformResult<Option<GeneralSettings>> {
    let existing = state.repo::<GeneralSettings>().list(tenant_id).await?;
    Ok(existing.into_iter().next())
}

async fn get_general_settings(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> PlatformResult<Json<GeneralSettings>> {
    admin(&ctx)?;
    let settings = load_settings(&state, ctx.tenant_id)
        .await?
        .unwrap_or_else(|| GeneralSettings::defaults(ctx.tenant_id));
    Ok(Json(settings))
}

/// Upsert the per-tenant settings singleton.
async fn update_general_settings(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<Value>,
) -> PlatformResult<Json<GeneralSettings>> {
    admin(&ctx)?;
    RuleSet::new()
        .rule("company_name", validation::string_length(1, 200))
        .rule("default_currency", validation::string_length(3, 3))
        .check(&payload)?;
    let request: UpdateSettings = serde_json::from_value(payload)?;

    if let Some(month) = request.fiscal_year_start_month {
        if !(1..=12).contains(&month) {
            return Err(PlatformError::business(
                "fiscal_year_start_month must be between 1 and 12",
            ));
        }
    }

    let repo = state.repo::<GeneralSettings>();
    let existing = load_settings(&state, ctx.tenant_id).await?;
    let is_new = existing.is_none();
    let mut settings = existing.unwrap_or_else(|| GeneralSettings::defaults(ctx.tenant_id));

    if let Some(company_name) = request.company_name {
        settings.company_name = company_name;
    }
    if let Some(currency) = request.default_currency {
        settings.default_currency = currency.to_ascii_uppercase();
    }
    if let Some(locale) = request.locale {
        settings.locale = locale;
    }
    if let Some(month) = request.fiscal_year_start_month {
        settings.fiscal_year_start_month = month;
    }
    if let Some(custom) = request.custom {
        settings.custom = custom;
    }
    settings.touch();

    if is_new {
        repo.insert(&settings).await?;
    } else {
        repo.update(&settings).await?;
    }
    Ok(Json(settings))
}
