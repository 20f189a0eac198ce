//! Management domain types — organizations, branches, users, leads,
//! prompts, practice calls, and the analytics event log.

use chrono::{DateTime, Utc};
use coach_core::types::{CallType, EventKind, LeadStatus, LeadType, PromptType, Role};
use coach_reporting::date_range::{DatePreset, DateRange};
use coach_reporting::funnel::{FunnelStage, FunnelStageKey};
use coach_reporting::timeseries::ChartPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ─── Organization & access ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A team within an organization. Leads, prompts, calls, and metrics are all
/// scoped to a branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub full_name: String,
    pub designation: Option<String>,
    pub role: Role,
    pub current_branch_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Leads & profiles ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub lead_type: LeadType,
    pub status: LeadStatus,
    pub known_to_agent: Option<String>,
    pub meeting_date: Option<DateTime<Utc>>,
    pub created_by_id: Uuid,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The writable demographic and financial attributes of a lead's profile.
/// Everything is optional; the practice persona is built from whatever is
/// filled in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDetails {
    // Basic details
    pub full_name: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub physical_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zipcode: Option<String>,
    /// An age range such as "18-23", not a number.
    pub age: Option<String>,
    pub occupation: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub designation: Option<String>,
    // Financial details
    pub dependents: Option<u32>,
    pub city_tier: Option<String>,
    pub earning_members: Option<u32>,
    pub income_range: Option<String>,
    pub savings: Option<f64>,
    pub existing_insurance_coverage: Option<String>,
    pub desired_insurance_coverage: Option<String>,
    pub car_loan: Option<bool>,
    pub home_loan: Option<bool>,
    pub other_loan: Option<bool>,
    // Persona details
    pub health_status: Option<String>,
    pub budget_conscious: Option<String>,
    pub trust_level: Option<String>,
    pub decision_making_style: Option<String>,
    pub financial_literacy: Option<String>,
    pub likes: Option<String>,
    pub dislikes: Option<String>,
    pub concerns_and_priorities: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub branch_id: Uuid,
    pub organization_id: Uuid,
    #[serde(flatten)]
    pub details: ProfileDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Frozen copy of a (lead, profile) pair taken when a call starts, so the
/// report always refers to the persona the trainee actually practiced
/// against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub branch_id: Uuid,
    pub organization_id: Uuid,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ─── Prompts ───────────────────────────────────────────────────────────────

/// A configurable persona script used to drive the simulated customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub text: String,
    pub description: String,
    pub report_prompt_text: Option<String>,
    pub known_to_agent: Option<String>,
    pub meeting_status: Option<LeadStatus>,
    pub prompt_type: PromptType,
    pub created_by_id: Uuid,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Calls ─────────────────────────────────────────────────────────────────

/// A practice-call record. `transcript` and `report` stay empty until the
/// external call provider delivers them via the completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub caller_name: String,
    pub lead_id: Uuid,
    pub profile_snapshot_id: Uuid,
    pub prompt_id: Option<Uuid>,
    pub branch_id: Uuid,
    pub organization_id: Uuid,
    pub call_type: CallType,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: Option<u64>,
    pub transcript: Option<String>,
    /// JSON-encoded report from the external generator; decoded on read.
    pub report: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Analytics events ──────────────────────────────────────────────────────

/// One row of the analytics event log the metrics scans run over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: EventKind,
    pub data: serde_json::Value,
    pub branch_id: Uuid,
    pub organization_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ─── API Request/Response types ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub organization_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBranchRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateLeadRequest {
    pub branch_id: Uuid,
    #[serde(default)]
    pub lead_type: LeadType,
    #[serde(default)]
    pub profile: ProfileDetails,
    pub known_to_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLeadRequest {
    pub status: Option<LeadStatus>,
    pub lead_type: Option<LeadType>,
    pub known_to_agent: Option<String>,
    pub meeting_date: Option<DateTime<Utc>>,
    pub profile: Option<ProfileDetails>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeadResponse {
    pub lead: Lead,
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct CreatePromptRequest {
    pub branch_id: Uuid,
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub description: String,
    pub report_prompt_text: Option<String>,
    pub known_to_agent: Option<String>,
    pub meeting_status: Option<LeadStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePromptRequest {
    pub name: Option<String>,
    pub text: Option<String>,
    pub description: Option<String>,
    pub report_prompt_text: Option<String>,
    pub known_to_agent: Option<String>,
    pub meeting_status: Option<LeadStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCallRequest {
    pub lead_id: Uuid,
    pub prompt_id: Option<Uuid>,
    #[serde(default)]
    pub call_type: CallType,
}

/// Ingestion payload from the external call provider once processing
/// finishes.
#[derive(Debug, Deserialize)]
pub struct CompleteCallRequest {
    pub transcript: String,
    pub duration_seconds: u64,
    pub report: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CallResponse {
    pub call: CallRecord,
    pub profile_snapshot: ProfileSnapshot,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: Uuid,
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

// ─── Metrics API types ─────────────────────────────────────────────────────

/// Window selector shared by the metrics endpoints: an explicit
/// `[start_date, end_date]`, a bare anchor date, or a named preset.
/// With none given the dashboard default of the last 7 days applies.
#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub branch_id: Uuid,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub preset: Option<DatePreset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelMode {
    Number,
    Percentage,
}

impl Default for FunnelMode {
    fn default() -> Self {
        FunnelMode::Number
    }
}

#[derive(Debug, Deserialize)]
pub struct FunnelMetricsQuery {
    pub branch_id: Uuid,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub preset: Option<DatePreset>,
    #[serde(default)]
    pub mode: FunnelMode,
}

#[derive(Debug, Deserialize)]
pub struct GraphQuery {
    pub branch_id: Uuid,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub preset: Option<DatePreset>,
    /// Chart window in days; defaults to the resolved range's span.
    pub days: Option<usize>,
}

/// Aggregate call counters for a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallCounts {
    pub call_started: i64,
    pub appointment_calls: i64,
    pub meeting_calls: i64,
    pub duration_minutes: f64,
}

/// Period-over-period deltas for the call counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallTrends {
    pub call_started: f64,
    pub appointment_calls: f64,
    pub meeting_calls: f64,
    pub duration_minutes: f64,
}

#[derive(Debug, Serialize)]
pub struct MetricsCountsResponse {
    pub funnel: HashMap<FunnelStageKey, i64>,
    pub calls: CallCounts,
}

#[derive(Debug, Serialize)]
pub struct FunnelMetricsResponse {
    pub range: DateRange,
    pub stages: Vec<FunnelStage>,
}

#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub call_count: Vec<ChartPoint>,
    pub total_duration_minutes: Vec<ChartPoint>,
}
