//! HR HTTP handlers.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::model::Training;
use crate::core::error::{PlatformError, PlatformResult};
use crate::core::tenant::TenantContext;
use crate::core::validation::{self, RuleSet};
use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trainings", get(list_trainings).post(plan_training))
        .route("/trainings/{id}", get(get_training))
        .route("/trainings/{id}/enroll", post(enroll))
        .route("/trainings/{id}/complete", post(complete_training))
        .route("/trainings/{id}/cancel", post(cancel_training))
}

#[derive(Debug, Deserialize)]
struct PlanTraining {
    title: String,
    trainer: Option<String>,
    starts_on: NaiveDate,
    ends_on: NaiveDate,
    capacity: u32,
}

#[derive(Debug, Deserialize)]
struct TrainingQuery {
    title: Option<String>,
}

async fn list_trainings(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<TrainingQuery>,
) -> PlatformResult<Json<Value>> {
    let repo = state.repo::<Training>();
    let trainings = if let Some(title) = &query.title {
        repo.search(ctx.tenant_id, "title", title).await?
    } else {
        repo.list(ctx.tenant_id).await?
    };
    Ok(Json(json!({
        "trainings": trainings,
        "count": trainings.len(),
    })))
}

async fn get_training(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Training>> {
    state.repo::<Training>().get(ctx.tenant_id, id).await.map(Json)
}

async fn plan_training(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<Value>,
) -> PlatformResult<(StatusCode, Json<Training>)> {
    RuleSet::new()
        .rule("title", validation::required())
        .rule("title", validation::string_length(1, 200))
        .rule("starts_on", validation::required())
        .rule("starts_on", validation::date_format("%Y-%m-%d"))
        .rule("ends_on", validation::required())
        .rule("ends_on", validation::date_format("%Y-%m-%d"))
        .rule("capacity", validation::required())
        .rule("capacity", validation::positive())
        .check(&payload)?;
    let request: PlanTraining = serde_json::from_value(payload)?;

    if request.ends_on < request.starts_on {
        return Err(PlatformError::business(
            "training cannot end before it starts",
        ));
    }

    let training = Training::plan(
        ctx.tenant_id,
        request.title,
        request.trainer,
        request.starts_on,
        request.ends_on,
        request.capacity,
    );
    state.repo::<Training>().insert(&training).await?;
    Ok((StatusCode::CREATED, Json(training)))
}

async fn enroll(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Training>> {
    let repo = state.repo::<Training>();
    let mut training = repo.get(ctx.tenant_id, id).await?;
    training.enroll()?;
    repo.update(&training).await?;
    Ok(Json(training))
}

async fn complete_training(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Training>> {
    let repo = state.repo::<Training>();
    let mut training = repo.get(ctx.tenant_id, id).await?;
    training.complete()?;
    repo.update(&training).await?;
    Ok(Json(training))
}

async fn cancel_training(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> PlatformResult<Json<Training>> {
    let repo = state.repo::<Training>();
    let mut training = repo.get(ctx.tenant_id, id).await?;
    training.cancel()?;
    repo.update(&training).await?;
    Ok(Json(training))
}
