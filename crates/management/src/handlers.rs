//! Axum REST handlers for the sales-training API.

use crate::auth;
use crate::models::*;
use crate::store::CoachStore;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use coach_core::types::CallReport;
use coach_reporting::date_range::{DatePreset, DateRange};
use coach_reporting::funnel;
use coach_reporting::timeseries::bucket_last_n;
use coach_reporting::transcript::{self, TranscriptTurn};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state.
#[derive(Clone)]
pub struct CoachState {
    pub store: Arc<CoachStore>,
    pub token_ttl_hours: i64,
}

#[derive(Debug, serde::Deserialize)]
pub struct BranchQuery {
    pub branch_id: Uuid,
}

fn error_response(
    status: StatusCode,
    error: &str,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.into(),
        }),
    )
}

/// Resolve the window selector shared by the metrics endpoints. Precedence:
/// named preset, explicit bounds, bare anchor; the dashboard default of the
/// last seven days otherwise.
fn resolve_window(
    preset: Option<DatePreset>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> DateRange {
    let now = Utc::now();
    match (preset, start_date, end_date) {
        (Some(preset), _, _) => DateRange::from_preset(preset, now),
        (None, Some(start), Some(end)) => DateRange::from_bounds(start, end),
        (None, Some(start), None) => DateRange::from_anchor(start, now),
        (None, None, _) => DateRange::from_preset(DatePreset::Last7Days, now),
    }
}

// ─── Auth ──────────────────────────────────────────────────────────────────

pub async fn handle_register(
    State(state): State<CoachState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), (StatusCode, Json<ErrorResponse>)> {
    match auth::register(&state.store, &req, state.token_ttl_hours) {
        Ok(resp) => {
            metrics::counter!("coach.users.registered").increment(1);
            Ok((StatusCode::CREATED, Json(resp)))
        }
        Err(e) => Err(error_response(
            StatusCode::BAD_REQUEST,
            "registration_failed",
            e.to_string(),
        )),
    }
}

pub async fn handle_login(
    State(state): State<CoachState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    match auth::authenticate(&state.store, &req, state.token_ttl_hours) {
        Ok(resp) => Ok(Json(resp)),
        Err(e) => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "auth_failed",
            e.to_string(),
        )),
    }
}

pub async fn current_user(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

// ─── Branches ──────────────────────────────────────────────────────────────

pub async fn list_branches(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
) -> Json<Vec<Branch>> {
    Json(state.store.list_branches(user.organization_id))
}

pub async fn create_branch(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateBranchRequest>,
) -> (StatusCode, Json<Branch>) {
    let branch = state.store.create_branch(user.organization_id, &req.name);
    (StatusCode::CREATED, Json(branch))
}

// ─── Leads ─────────────────────────────────────────────────────────────────

pub async fn list_leads(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Query(query): Query<BranchQuery>,
) -> Json<Vec<LeadResponse>> {
    Json(state.store.list_leads(query.branch_id, &user))
}

pub async fn create_lead(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateLeadRequest>,
) -> (StatusCode, Json<LeadResponse>) {
    let lead = state.store.create_lead(req, &user);
    metrics::counter!("coach.leads.created").increment(1);
    (StatusCode::CREATED, Json(lead))
}

pub async fn get_lead(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeadResponse>, StatusCode> {
    state
        .store
        .get_lead(id, &user)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn update_lead(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLeadRequest>,
) -> Result<Json<LeadResponse>, StatusCode> {
    state
        .store
        .update_lead(id, req, &user)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn delete_lead(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, StatusCode> {
    if state.store.delete_lead(id, &user) {
        metrics::counter!("coach.leads.deleted").increment(1);
        Ok(Json(DeleteResponse { id, deleted: true }))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

// ─── Prompts ───────────────────────────────────────────────────────────────

pub async fn list_prompts(
    State(state): State<CoachState>,
    Query(query): Query<BranchQuery>,
) -> Json<Vec<Prompt>> {
    Json(state.store.list_prompts(query.branch_id))
}

pub async fn create_prompt(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreatePromptRequest>,
) -> (StatusCode, Json<Prompt>) {
    let prompt = state.store.create_prompt(req, &user);
    metrics::counter!("coach.prompts.created").increment(1);
    (StatusCode::CREATED, Json(prompt))
}

pub async fn get_prompt(
    State(state): State<CoachState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Prompt>, StatusCode> {
    state.store.get_prompt(id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn update_prompt(
    State(state): State<CoachState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePromptRequest>,
) -> Result<Json<Prompt>, StatusCode> {
    state
        .store
        .update_prompt(id, req)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn delete_prompt(
    State(state): State<CoachState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, StatusCode> {
    if state.store.delete_prompt(id) {
        Ok(Json(DeleteResponse { id, deleted: true }))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

// ─── Calls ─────────────────────────────────────────────────────────────────

pub async fn create_call(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateCallRequest>,
) -> Result<(StatusCode, Json<CallResponse>), (StatusCode, Json<ErrorResponse>)> {
    match state.store.create_call(req, &user) {
        Some(response) => {
            metrics::counter!("coach.calls.started").increment(1);
            Ok((StatusCode::CREATED, Json(response)))
        }
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            "lead_not_found",
            "Lead not found",
        )),
    }
}

/// Ingestion endpoint for the external call provider's webhook.
pub async fn complete_call(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteCallRequest>,
) -> Result<Json<CallRecord>, StatusCode> {
    let completed = state.store.complete_call(id, req, &user);
    if completed.is_some() {
        metrics::counter!("coach.calls.completed").increment(1);
    }
    completed.map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn list_calls(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Query(query): Query<BranchQuery>,
) -> Json<Vec<CallResponse>> {
    Json(state.store.list_calls(query.branch_id, &user))
}

pub async fn get_call(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<CallRecord>, StatusCode> {
    state
        .store
        .get_call(id, &user)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn call_transcript(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TranscriptTurn>>, (StatusCode, Json<ErrorResponse>)> {
    let call = state
        .store
        .get_call(id, &user)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "call_not_found", "Call not found"))?;

    match call.transcript {
        Some(raw) => Ok(Json(transcript::parse(&raw))),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            "transcript_pending",
            "Transcript not generated yet",
        )),
    }
}

pub async fn call_report(
    State(state): State<CoachState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<CallReport>, (StatusCode, Json<ErrorResponse>)> {
    let call = state
        .store
        .get_call(id, &user)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "call_not_found", "Call not found"))?;

    let raw = call.report.ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            "report_pending",
            "Report not generated yet",
        )
    })?;

    serde_json::from_str::<CallReport>(&raw).map(Json).map_err(|e| {
        error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "report_malformed",
            format!("Report payload does not match schema: {}", e),
        )
    })
}

// ─── Metrics ───────────────────────────────────────────────────────────────

pub async fn metrics_counts(
    State(state): State<CoachState>,
    Query(query): Query<MetricsQuery>,
) -> Json<MetricsCountsResponse> {
    let range = resolve_window(query.preset, query.start_date, query.end_date);
    Json(MetricsCountsResponse {
        funnel: state.store.funnel_counts(query.branch_id, &range),
        calls: state.store.call_counts(query.branch_id, &range),
    })
}

pub async fn metrics_funnel(
    State(state): State<CoachState>,
    Query(query): Query<FunnelMetricsQuery>,
) -> Json<FunnelMetricsResponse> {
    let range = resolve_window(query.preset, query.start_date, query.end_date);
    let counts = state.store.funnel_counts(query.branch_id, &range);
    let trends = state.store.funnel_trends(query.branch_id, &range);

    let stages = funnel::aggregate(&counts, &trends);
    let stages = match query.mode {
        FunnelMode::Number => stages,
        FunnelMode::Percentage => funnel::with_percentages(&stages),
    };

    Json(FunnelMetricsResponse { range, stages })
}

pub async fn metrics_graphs(
    State(state): State<CoachState>,
    Query(query): Query<GraphQuery>,
) -> Json<GraphResponse> {
    let range = resolve_window(query.preset, query.start_date, query.end_date);
    let days = query
        .days
        .unwrap_or_else(|| range.span().num_days().max(1) as usize);

    let (call_count, total_duration_minutes) = state.store.call_graph(query.branch_id, &range);

    Json(GraphResponse {
        call_count: bucket_last_n(&call_count, days),
        total_duration_minutes: bucket_last_n(&total_duration_minutes, days),
    })
}

pub async fn funnel_trends(
    State(state): State<CoachState>,
    Query(query): Query<MetricsQuery>,
) -> Json<HashMap<funnel::FunnelStageKey, f64>> {
    let range = resolve_window(query.preset, query.start_date, query.end_date);
    Json(state.store.funnel_trends(query.branch_id, &range))
}

pub async fn call_trends(
    State(state): State<CoachState>,
    Query(query): Query<MetricsQuery>,
) -> Json<CallTrends> {
    let range = resolve_window(query.preset, query.start_date, query.end_date);
    Json(state.store.call_trends(query.branch_id, &range))
}

// ─── Operational ───────────────────────────────────────────────────────────

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
