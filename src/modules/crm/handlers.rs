//! CRM HTTP handlers.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post, put};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::model::{Lead, LeadStage, Meeting, Territory};
use crate::core::error::{PlatformError, PlatformResult};
use crate::core::tenant::TenantContext;
use crate::core::validation::{self, RuleSet};
use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leads", get(list_leads).post(create_lead))
        .route(
            "/leads/{id}",
            get(get_lead).put(update_lead).delete(delete_lead),
        )
        .route("/leads/{id}/advance", post(advance_lead))
        .route("/territories", get(list_territories).post(create_territory))
        .route(
            "/territories/{id}",
            get(get_territory)
                .put(update_territory)
                .delete(delete_territory),
        )
        .route("/meetings", get(list_meetings).post(schedule_meeting))
        .route("/meetings/{id}", get(get_meeting))
        .route("/meetings/{id}/hold", post(hold_meeting))
        .route("/meetings/{id}/cancel", post(cancel_meeting))
        .route("/meetings/{id}/reschedule", put(reschedule_meeting))
}

// =============================================================================
// Leads
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateLead {
    contact_name: String,
    company: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    territory_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct UpdateLead {
    contact_name: Option<String>,
    company: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    territory_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct AdvanceLead {
    stage: LeadStage,
}

#[derive(Debug, Deserialize)]
struct LeadQuery {
    company: Option<String>,
    contact_name: Option<String>,
}

async fn list_leads(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<LeadQuery>,
) -> PlatformResult<Json<Value>> {
    let repo = state.repo::<Lead>();
    let leads = if let Some(company) = &query.company {
        repo.search(ctx.tenant_id, "company", company).await?
    } else if let Some(contact) = &query.contact_name {
        repo.search(ctx.tenant_id, "contact_name", contact).await?
    } else {
        repo.list(ctx.tenant_id).await?
    };
    Ok(Json(json!({ "leads": leads, "count": leads.len() })))
}

async fn get_lead(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Lead>> {
    state.repo::<Lead>().get(ctx.tenant_id, id).await.map(Json)
}

async fn create_lead(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<Value>,
) -> PlatformResult<(StatusCode, Json<Lead>)> {
    RuleSet::new()
        .rule("contact_name", validation::required())
        .rule("contact_name", validation::string_length(1, 200))
        .check(&payload)?;
    let request: CreateLead = serde_json::from_value(payload)?;

    if let Some(territory_id) = request.territory_id {
        // Dangling territory references are caller mistakes, not data.
        state
            .repo::<Territory>()
            .get(ctx.tenant_id, territory_id)
            .await?;
    }

    let lead = Lead::capture(
        ctx.tenant_id,
        request.contact_name,
        request.company,
        request.email,
        request.phone,
        request.territory_id,
    );
    state.repo::<Lead>().insert(&lead).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

async fn update_lead(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> PlatformResult<Json<Lead>> {
    RuleSet::new()
        .rule("contact_name", validation::string_length(1, 200))
        .check(&payload)?;
    let request: UpdateLead = serde_json::from_value(payload)?;

    let repo = state.repo::<Lead>();
    let mut lead = repo.get(ctx.tenant_id, id).await?;

    if let Some(contact_name) = request.contact_name {
        lead.contact_name = contact_name;
    }
    if let Some(company) = request.company {
        lead.company = Some(company);
    }
    if let Some(email) = request.email {
        lead.email = Some(email);
    }
    if let Some(phone) = request.phone {
        lead.phone = Some(phone);
    }
    if let Some(territory_id) = request.territory_id {
        state
            .repo::<Territory>()
            .get(ctx.tenant_id, territory_id)
            .await?;
        lead.territory_id = Some(territory_id);
    }
    lead.touch();
    repo.update(&lead).await?;
    Ok(Json(lead))
}

async fn delete_lead(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<StatusCode> {
    let repo = state.repo::<Lead>();
    let mut lead = repo.get(ctx.tenant_id, id).await?;
    lead.soft_delete();
    repo.update(&lead).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn advance_lead(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(request): Json<AdvanceLead>,
) -> PlatformResult<Json<Lead>> {
    let repo = state.repo::<Lead>();
    let mut lead = repo.get(ctx.tenant_id, id).await?;
    lead.advance(request.stage)?;
    repo.update(&lead).await?;
    Ok(Json(lead))
}

// =============================================================================
// Territories
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateTerritory {
    code: String,
    name: String,
    region: Option<String>,
    manager: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateTerritory {
    name: Option<String>,
    region: Option<String>,
    manager: Option<String>,
}

async fn list_territories(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> PlatformResult<Json<Value>> {
    let territories = state.repo::<Territory>().list(ctx.tenant_id).await?;
    Ok(Json(json!({
        "territories": territories,
        "count": territories.len(),
    })))
}

async fn get_territory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Territory>> {
    state
        .repo::<Territory>()
        .get(ctx.tenant_id, id)
        .await
        .map(Json)
}

async fn create_territory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<Value>,
) -> PlatformResult<(StatusCode, Json<Territory>)> {
    RuleSet::new()
        .rule("code", validation::required())
        .rule("code", validation::string_length(2, 32))
        .rule("name", validation::required())
        .rule("name", validation::string_length(1, 200))
        .check(&payload)?;
    let request: CreateTerritory = serde_json::from_value(payload)?;

    let repo = state.repo::<Territory>();
    let duplicates = repo.search(ctx.tenant_id, "code", &request.code).await?;
    if !duplicates.is_empty() {
        return Err(PlatformError::conflict(format!(
            "territory code '{}' is already in use",
            request.code
        )));
    }

    let territory = Territory::new(
        ctx.tenant_id,
        request.code,
        request.name,
        request.region,
        request.manager,
    );
    repo.insert(&territory).await?;
    Ok((StatusCode::CREATED, Json(territory)))
}

async fn update_territory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> PlatformResult<Json<Territory>> {
    RuleSet::new()
        .rule("name", validation::string_length(1, 200))
        .check(&payload)?;
    let request: UpdateTerritory = serde_json::from_value(payload)?;

    let repo = state.repo::<Territory>();
    let mut territory = repo.get(ctx.tenant_id, id).await?;

    if let Some(name) = request.name {
        territory.name = name;
    }
    if let Some(region) = request.region {
        territory.region = Some(region);
    }
    if let Some(manager) = request.manager {
        territory.manager = Some(manager);
    }
    territory.touch();
    repo.update(&territory).await?;
    Ok(Json(territory))
}

async fn delete_territory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<StatusCode> {
    let repo = state.repo::<Territory>();
    let mut territory = repo.get(ctx.tenant_id, id).await?;

    // A territory with live leads attached cannot be removed.
    let leads = state.repo::<Lead>().list(ctx.tenant_id).await?;
    if leads.iter().any(|l| l.territory_id == Some(territory.id)) {
        return Err(PlatformError::conflict(format!(
            "territory '{}' still has leads assigned",
            territory.code
        )));
    }

    territory.soft_delete();
    repo.update(&territory).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Meetings
// =============================================================================

#[derive(Debug, Deserialize)]
struct ScheduleMeeting {
    subject: String,
    lead_id: Option<Uuid>,
    scheduled_at: DateTime<Utc>,
    duration_minutes: u32,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RescheduleMeeting {
    scheduled_at: DateTime<Utc>,
    duration_minutes: Option<u32>,
}

async fn list_meetings(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> PlatformResult<Json<Value>> {
    let meetings = state.repo::<Meeting>().list(ctx.tenant_id).await?;
    Ok(Json(json!({ "meetings": meetings, "count": meetings.len() })))
}

async fn get_meeting(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Meeting>> {
    state.repo::<Meeting>().get(ctx.tenant_id, id).await.map(Json)
}

async fn schedule_meeting(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<Value>,
) -> PlatformResult<(StatusCode, Json<Meeting>)> {
    RuleSet::new()
        .rule("subject", validation::required())
        .rule("subject", validation::string_length(1, 200))
        .rule("scheduled_at", validation::required())
        .rule("duration_minutes", validation::required())
        .rule("duration_minutes", validation::positive())
        .check(&payload)?;
    let request: ScheduleMeeting = serde_json::from_value(payload)?;

    if let Some(lead_id) = request.lead_id {
        state.repo::<Lead>().get(ctx.tenant_id, lead_id).await?;
    }

    let meeting = Meeting::schedule(
        ctx.tenant_id,
        request.subject,
        request.lead_id,
        request.scheduled_at,
        request.duration_minutes,
        request.location,
    );
    state.repo::<Meeting>().insert(&meeting).await?;
    Ok((StatusCode::CREATED, Json(meeting)))
}

async fn reschedule_meeting(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(request): Json<RescheduleMeeting>,
) -> PlatformResult<Json<Meeting>> {
    let repo = state.repo::<Meeting>();
    let mut meeting = repo.get(ctx.tenant_id, id).await?;

    if meeting.status != super::model::MeetingStatus::Scheduled {
        return Err(PlatformError::business(format!(
            "meeting '{}' is {} and cannot be rescheduled",
            meeting.subject, meeting.status
        )));
    }
    meeting.scheduled_at = request.scheduled_at;
    if let Some(duration) = request.duration_minutes {
        meeting.duration_minutes = duration;
    }
    meeting.touch();
    repo.update(&meeting).await?;
    Ok(Json(meeting))
}

async fn hold_meeting(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Meeting>> {
    let repo = state.repo::<Meeting>();
    let mut meeting = repo.get(ctx.tenant_id, id).await?;
    meeting.hold()?;
    repo.update(&meeting).await?;
    Ok(Json(meeting))
}

async fn cancel_meeting(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Meeting>> {
    let repo = state.repo::<Meeting>();
    let mut meeting = repo.get(ctx.tenant_id, id).await?;
    meeting.cancel()?;
    repo.update(&meeting).await?;
    Ok(Json(meeting))
}
