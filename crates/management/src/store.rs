//! In-memory application store backed by DashMap.
//!
//! Production: replace with PostgreSQL (sqlx) or similar ACID store.
//! This provides the same API surface for development and testing. The
//! analytics event log lives here too; every metrics endpoint is a scan
//! over it.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use coach_core::types::{CallType, EventKind, LeadStatus, LeadType, PromptType, Role};
use coach_reporting::date_range::DateRange;
use coach_reporting::funnel::{FunnelStageKey, CANONICAL_ORDER};
use coach_reporting::timeseries::TimeSeriesPoint;
use coach_reporting::trend::trend_percentage;
use dashmap::DashMap;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::auth;
use crate::models::*;

/// An issued bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Admins see every record in the branch; managers only records they
/// created.
fn created_by_filter(user: &User) -> Option<Uuid> {
    match user.role {
        Role::Admin => None,
        Role::Manager => Some(user.id),
    }
}

/// Thread-safe in-memory store for the whole application.
pub struct CoachStore {
    organizations: DashMap<Uuid, Organization>,
    branches: DashMap<Uuid, Branch>,
    users: DashMap<Uuid, User>,
    leads: DashMap<Uuid, Lead>,
    // Profiles are 1:1 with leads and keyed by lead id.
    profiles: DashMap<Uuid, Profile>,
    snapshots: DashMap<Uuid, ProfileSnapshot>,
    prompts: DashMap<Uuid, Prompt>,
    calls: DashMap<Uuid, CallRecord>,
    events: DashMap<Uuid, Event>,
    sessions: DashMap<String, Session>,
}

impl CoachStore {
    pub fn new() -> Self {
        info!("Coach store initialized (in-memory, development mode)");
        Self {
            organizations: DashMap::new(),
            branches: DashMap::new(),
            users: DashMap::new(),
            leads: DashMap::new(),
            profiles: DashMap::new(),
            snapshots: DashMap::new(),
            prompts: DashMap::new(),
            calls: DashMap::new(),
            events: DashMap::new(),
            sessions: DashMap::new(),
        }
    }

    // ─── Organizations & branches ──────────────────────────────────────────

    pub fn create_organization(&self, name: &str) -> Organization {
        let now = Utc::now();
        let organization = Organization {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.organizations
            .insert(organization.id, organization.clone());
        organization
    }

    pub fn create_branch(&self, organization_id: Uuid, name: &str) -> Branch {
        let now = Utc::now();
        let branch = Branch {
            id: Uuid::new_v4(),
            organization_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.branches.insert(branch.id, branch.clone());
        branch
    }

    pub fn list_branches(&self, organization_id: Uuid) -> Vec<Branch> {
        let mut branches: Vec<Branch> = self
            .branches
            .iter()
            .filter(|r| r.value().organization_id == organization_id)
            .map(|r| r.value().clone())
            .collect();
        branches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        branches
    }

    // ─── Users & sessions ──────────────────────────────────────────────────

    pub fn create_user(
        &self,
        organization_id: Uuid,
        email: &str,
        hashed_password: &str,
        full_name: &str,
        role: Role,
        current_branch_id: Option<Uuid>,
    ) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            organization_id,
            email: email.to_lowercase(),
            hashed_password: hashed_password.to_string(),
            full_name: full_name.to_string(),
            designation: None,
            role,
            current_branch_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id, user.clone());
        user
    }

    pub fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|r| r.value().clone())
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        let email = email.to_lowercase();
        self.users
            .iter()
            .find(|r| r.value().email == email)
            .map(|r| r.value().clone())
    }

    pub fn create_session(&self, token: &str, user_id: Uuid, expires_at: DateTime<Utc>) {
        self.sessions
            .insert(token.to_string(), Session { user_id, expires_at });
    }

    /// Resolve a bearer token to its user; expired tokens are evicted.
    pub fn validate_session(&self, token: &str) -> Option<User> {
        let session = self.sessions.get(token).map(|r| r.value().clone())?;
        if session.expires_at <= Utc::now() {
            self.sessions.remove(token);
            return None;
        }
        self.get_user(session.user_id)
    }

    // ─── Leads ─────────────────────────────────────────────────────────────

    pub fn create_lead(&self, req: CreateLeadRequest, user: &User) -> LeadResponse {
        let now = Utc::now();
        let lead = Lead {
            id: Uuid::new_v4(),
            organization_id: user.organization_id,
            branch_id: req.branch_id,
            lead_type: req.lead_type,
            status: LeadStatus::YetToContact,
            known_to_agent: req.known_to_agent,
            meeting_date: None,
            created_by_id: user.id,
            created_by_name: user.full_name.clone(),
            created_at: now,
            updated_at: now,
        };
        let profile = Profile {
            id: Uuid::new_v4(),
            lead_id: lead.id,
            branch_id: req.branch_id,
            organization_id: user.organization_id,
            details: req.profile,
            created_at: now,
            updated_at: now,
        };
        self.leads.insert(lead.id, lead.clone());
        self.profiles.insert(lead.id, profile.clone());

        self.record_event(
            EventKind::LeadCreated,
            json!({
                "lead_id": lead.id,
                "profile_id": profile.id,
                "lead_type": lead.lead_type,
            }),
            lead.branch_id,
            lead.organization_id,
        );

        LeadResponse { lead, profile }
    }

    pub fn list_leads(&self, branch_id: Uuid, user: &User) -> Vec<LeadResponse> {
        let owner = created_by_filter(user);
        let mut leads: Vec<LeadResponse> = self
            .leads
            .iter()
            .filter(|r| {
                let lead = r.value();
                lead.branch_id == branch_id
                    && lead.organization_id == user.organization_id
                    && owner.map_or(true, |owner| lead.created_by_id == owner)
            })
            .filter_map(|r| {
                let lead = r.value().clone();
                let profile = self.profiles.get(&lead.id).map(|p| p.value().clone())?;
                Some(LeadResponse { lead, profile })
            })
            .collect();
        leads.sort_by(|a, b| b.lead.created_at.cmp(&a.lead.created_at));
        leads
    }

    fn lead_response(&self, id: Uuid) -> Option<LeadResponse> {
        let lead = self.leads.get(&id).map(|r| r.value().clone())?;
        let profile = self.profiles.get(&id).map(|r| r.value().clone())?;
        Some(LeadResponse { lead, profile })
    }

    /// Fetch a lead visible to `user`: same organization, and for managers
    /// only leads they created.
    pub fn get_lead(&self, id: Uuid, user: &User) -> Option<LeadResponse> {
        let response = self.lead_response(id)?;
        if response.lead.organization_id != user.organization_id {
            return None;
        }
        if let Some(owner) = created_by_filter(user) {
            if response.lead.created_by_id != owner {
                return None;
            }
        }
        Some(response)
    }

    pub fn update_lead(
        &self,
        id: Uuid,
        req: UpdateLeadRequest,
        user: &User,
    ) -> Option<LeadResponse> {
        self.get_lead(id, user)?;
        let now = Utc::now();
        let (status_change, type_change, branch_id, organization_id) = {
            let mut entry = self.leads.get_mut(&id)?;
            let lead = entry.value_mut();
            let status_change = match req.status {
                Some(status) if status != lead.status => {
                    lead.status = status;
                    Some(status)
                }
                _ => None,
            };
            let type_change = match req.lead_type {
                Some(lead_type) if lead_type != lead.lead_type => {
                    lead.lead_type = lead_type;
                    Some(lead_type)
                }
                _ => None,
            };
            if let Some(known_to_agent) = req.known_to_agent {
                lead.known_to_agent = Some(known_to_agent);
            }
            if let Some(meeting_date) = req.meeting_date {
                lead.meeting_date = Some(meeting_date);
            }
            lead.updated_at = now;
            (status_change, type_change, lead.branch_id, lead.organization_id)
        };

        if let Some(details) = req.profile {
            if let Some(mut entry) = self.profiles.get_mut(&id) {
                let profile = entry.value_mut();
                profile.details = details;
                profile.updated_at = now;
            }
        }

        if let Some(status) = status_change {
            self.record_event(
                EventKind::LeadStatusUpdated,
                json!({"lead_id": id, "status": status}),
                branch_id,
                organization_id,
            );
        }
        if let Some(lead_type) = type_change {
            self.record_event(
                EventKind::LeadTypeUpdated,
                json!({"lead_id": id, "lead_type": lead_type}),
                branch_id,
                organization_id,
            );
        }

        self.lead_response(id)
    }

    pub fn delete_lead(&self, id: Uuid, user: &User) -> bool {
        if self.get_lead(id, user).is_none() {
            return false;
        }
        let removed = self.leads.remove(&id).is_some();
        if removed {
            self.profiles.remove(&id);
        }
        removed
    }

    // ─── Prompts ───────────────────────────────────────────────────────────

    pub fn create_prompt(&self, req: CreatePromptRequest, user: &User) -> Prompt {
        let now = Utc::now();
        let prompt = Prompt {
            id: Uuid::new_v4(),
            organization_id: user.organization_id,
            branch_id: req.branch_id,
            name: req.name,
            text: req.text,
            description: req.description,
            report_prompt_text: req.report_prompt_text,
            known_to_agent: req.known_to_agent,
            meeting_status: req.meeting_status,
            prompt_type: PromptType::Conversation,
            created_by_id: user.id,
            created_by_name: user.full_name.clone(),
            created_at: now,
            updated_at: now,
        };
        self.prompts.insert(prompt.id, prompt.clone());
        prompt
    }

    pub fn list_prompts(&self, branch_id: Uuid) -> Vec<Prompt> {
        let mut prompts: Vec<Prompt> = self
            .prompts
            .iter()
            .filter(|r| r.value().branch_id == branch_id)
            .map(|r| r.value().clone())
            .collect();
        prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        prompts
    }

    pub fn get_prompt(&self, id: Uuid) -> Option<Prompt> {
        self.prompts.get(&id).map(|r| r.value().clone())
    }

    pub fn update_prompt(&self, id: Uuid, req: UpdatePromptRequest) -> Option<Prompt> {
        self.prompts.get_mut(&id).map(|mut entry| {
            let prompt = entry.value_mut();
            if let Some(name) = req.name {
                prompt.name = name;
            }
            if let Some(text) = req.text {
                prompt.text = text;
            }
            if let Some(description) = req.description {
                prompt.description = description;
            }
            if let Some(report_prompt_text) = req.report_prompt_text {
                prompt.report_prompt_text = Some(report_prompt_text);
            }
            if let Some(known_to_agent) = req.known_to_agent {
                prompt.known_to_agent = Some(known_to_agent);
            }
            if let Some(meeting_status) = req.meeting_status {
                prompt.meeting_status = Some(meeting_status);
            }
            prompt.updated_at = Utc::now();
            prompt.clone()
        })
    }

    pub fn delete_prompt(&self, id: Uuid) -> bool {
        self.prompts.remove(&id).is_some()
    }

    // ─── Calls ─────────────────────────────────────────────────────────────

    /// Create a call record and freeze the lead's profile into a snapshot.
    /// Returns None when the lead does not exist or belongs to another
    /// organization.
    pub fn create_call(&self, req: CreateCallRequest, user: &User) -> Option<CallResponse> {
        let LeadResponse { lead, profile } = self.lead_response(req.lead_id)?;
        if lead.organization_id != user.organization_id {
            return None;
        }
        let now = Utc::now();

        let snapshot = ProfileSnapshot {
            id: Uuid::new_v4(),
            lead_id: lead.id,
            branch_id: lead.branch_id,
            organization_id: lead.organization_id,
            data: json!({"lead": lead, "profile": profile}),
            created_at: now,
        };
        self.snapshots.insert(snapshot.id, snapshot.clone());

        let call = CallRecord {
            id: Uuid::new_v4(),
            user_id: user.id,
            caller_name: user.full_name.clone(),
            lead_id: lead.id,
            profile_snapshot_id: snapshot.id,
            prompt_id: req.prompt_id,
            branch_id: lead.branch_id,
            organization_id: lead.organization_id,
            call_type: req.call_type,
            started_at: now,
            duration_seconds: None,
            transcript: None,
            report: None,
            created_at: now,
            updated_at: now,
        };
        self.calls.insert(call.id, call.clone());

        self.record_event(
            EventKind::CallStarted,
            json!({
                "call_id": call.id,
                "user_id": user.id,
                "lead_id": lead.id,
                "lead_type": lead.lead_type,
                "lead_status": lead.status,
                "call_type": call.call_type,
                "profile_snapshot_id": snapshot.id,
            }),
            call.branch_id,
            call.organization_id,
        );

        Some(CallResponse {
            call,
            profile_snapshot: snapshot,
        })
    }

    /// Attach the external provider's transcript, duration, and report.
    /// The delivery is accepted for any call in the caller's organization,
    /// regardless of who initiated it.
    pub fn complete_call(
        &self,
        id: Uuid,
        req: CompleteCallRequest,
        user: &User,
    ) -> Option<CallRecord> {
        let call = {
            let mut entry = self.calls.get_mut(&id)?;
            let call = entry.value_mut();
            if call.organization_id != user.organization_id {
                return None;
            }
            call.transcript = Some(req.transcript);
            call.duration_seconds = Some(req.duration_seconds);
            call.report = req.report;
            call.updated_at = Utc::now();
            call.clone()
        };

        self.record_event(
            EventKind::CallEnded,
            json!({
                "call_id": call.id,
                "lead_id": call.lead_id,
                "call_type": call.call_type,
                "duration_seconds": req.duration_seconds,
            }),
            call.branch_id,
            call.organization_id,
        );

        Some(call)
    }

    pub fn list_calls(&self, branch_id: Uuid, user: &User) -> Vec<CallResponse> {
        let owner = created_by_filter(user);
        let mut calls: Vec<CallResponse> = self
            .calls
            .iter()
            .filter(|r| {
                let call = r.value();
                call.branch_id == branch_id
                    && call.organization_id == user.organization_id
                    && owner.map_or(true, |owner| call.user_id == owner)
            })
            .filter_map(|r| {
                let call = r.value().clone();
                let profile_snapshot = self
                    .snapshots
                    .get(&call.profile_snapshot_id)
                    .map(|s| s.value().clone())?;
                Some(CallResponse {
                    call,
                    profile_snapshot,
                })
            })
            .collect();
        calls.sort_by(|a, b| b.call.started_at.cmp(&a.call.started_at));
        calls
    }

    /// Fetch a call visible to `user`: same organization, and for managers
    /// only calls they initiated.
    pub fn get_call(&self, id: Uuid, user: &User) -> Option<CallRecord> {
        let call = self.calls.get(&id).map(|r| r.value().clone())?;
        if call.organization_id != user.organization_id {
            return None;
        }
        if let Some(owner) = created_by_filter(user) {
            if call.user_id != owner {
                return None;
            }
        }
        Some(call)
    }

    // ─── Event log ─────────────────────────────────────────────────────────

    pub fn record_event(
        &self,
        name: EventKind,
        data: serde_json::Value,
        branch_id: Uuid,
        organization_id: Uuid,
    ) -> Event {
        self.record_event_at(name, data, branch_id, organization_id, Utc::now())
    }

    /// Insert an event with an explicit timestamp. Seeding and tests use
    /// this to build historical windows.
    pub fn record_event_at(
        &self,
        name: EventKind,
        data: serde_json::Value,
        branch_id: Uuid,
        organization_id: Uuid,
        at: DateTime<Utc>,
    ) -> Event {
        let event = Event {
            id: Uuid::new_v4(),
            name,
            data,
            branch_id,
            organization_id,
            created_at: at,
        };
        self.events.insert(event.id, event.clone());
        event
    }

    fn events_in(&self, branch_id: Uuid, range: &DateRange) -> Vec<Event> {
        self.events
            .iter()
            .filter(|r| {
                let event = r.value();
                event.branch_id == branch_id
                    && event.created_at >= range.start
                    && event.created_at <= range.end
            })
            .map(|r| r.value().clone())
            .collect()
    }

    // ─── Metrics scans ─────────────────────────────────────────────────────

    /// Distinct leads per funnel stage within the window. Stage 0 counts
    /// suspect creations; the remaining stages count status transitions.
    pub fn funnel_counts(&self, branch_id: Uuid, range: &DateRange) -> HashMap<FunnelStageKey, i64> {
        let mut distinct: HashMap<FunnelStageKey, HashSet<String>> = CANONICAL_ORDER
            .iter()
            .map(|key| (*key, HashSet::new()))
            .collect();

        for event in self.events_in(branch_id, range) {
            let Some(lead_id) = event.data.get("lead_id").and_then(|v| v.as_str()) else {
                continue;
            };
            match event.name {
                EventKind::LeadCreated => {
                    let is_suspect = event
                        .data
                        .get("lead_type")
                        .and_then(|v| serde_json::from_value::<LeadType>(v.clone()).ok())
                        == Some(LeadType::Suspect);
                    if is_suspect {
                        if let Some(set) = distinct.get_mut(&FunnelStageKey::LeadCreatedSuspect) {
                            set.insert(lead_id.to_string());
                        }
                    }
                }
                EventKind::LeadStatusUpdated => {
                    let status = event
                        .data
                        .get("status")
                        .and_then(|v| serde_json::from_value::<LeadStatus>(v.clone()).ok());
                    if let Some(status) = status {
                        if let Some(set) = distinct.get_mut(&FunnelStageKey::from(status)) {
                            set.insert(lead_id.to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        distinct
            .into_iter()
            .map(|(key, leads)| (key, leads.len() as i64))
            .collect()
    }

    /// Call counters within the window: started-call counts by type plus the
    /// summed duration of ended calls in minutes.
    pub fn call_counts(&self, branch_id: Uuid, range: &DateRange) -> CallCounts {
        let mut counts = CallCounts::default();

        for event in self.events_in(branch_id, range) {
            match event.name {
                EventKind::CallStarted => {
                    counts.call_started += 1;
                    let call_type = event
                        .data
                        .get("call_type")
                        .and_then(|v| serde_json::from_value::<CallType>(v.clone()).ok());
                    match call_type {
                        Some(CallType::AppointmentCall) => counts.appointment_calls += 1,
                        Some(CallType::MeetingCall) => counts.meeting_calls += 1,
                        None => {}
                    }
                }
                EventKind::CallEnded => {
                    let seconds = event
                        .data
                        .get("duration_seconds")
                        .and_then(|v| v.as_u64())
                        .unwrap_or(0);
                    counts.duration_minutes += seconds as f64 / 60.0;
                }
                _ => {}
            }
        }

        counts
    }

    /// Day-grouped call-count and duration series for the graphs, ascending
    /// by date.
    pub fn call_graph(
        &self,
        branch_id: Uuid,
        range: &DateRange,
    ) -> (Vec<TimeSeriesPoint>, Vec<TimeSeriesPoint>) {
        let mut call_counts: BTreeMap<chrono::NaiveDate, f64> = BTreeMap::new();
        let mut durations: BTreeMap<chrono::NaiveDate, f64> = BTreeMap::new();

        for event in self.events_in(branch_id, range) {
            let day = event.created_at.date_naive();
            match event.name {
                EventKind::CallStarted => {
                    *call_counts.entry(day).or_insert(0.0) += 1.0;
                }
                EventKind::CallEnded => {
                    let seconds = event
                        .data
                        .get("duration_seconds")
                        .and_then(|v| v.as_u64())
                        .unwrap_or(0);
                    *durations.entry(day).or_insert(0.0) += seconds as f64 / 60.0;
                }
                _ => {}
            }
        }

        let to_series = |grouped: BTreeMap<chrono::NaiveDate, f64>| {
            grouped
                .into_iter()
                .map(|(event_date, metric_value)| TimeSeriesPoint {
                    event_date,
                    metric_value,
                })
                .collect()
        };

        (to_series(call_counts), to_series(durations))
    }

    /// Per-stage funnel deltas versus the window immediately before this one.
    pub fn funnel_trends(&self, branch_id: Uuid, range: &DateRange) -> HashMap<FunnelStageKey, f64> {
        let current = self.funnel_counts(branch_id, range);
        let previous = self.funnel_counts(branch_id, &range.previous());

        CANONICAL_ORDER
            .iter()
            .map(|key| {
                let current = current.get(key).copied().unwrap_or(0) as f64;
                let previous = previous.get(key).copied().unwrap_or(0) as f64;
                (*key, trend_percentage(current, previous))
            })
            .collect()
    }

    /// Call-counter deltas versus the window immediately before this one.
    pub fn call_trends(&self, branch_id: Uuid, range: &DateRange) -> CallTrends {
        let current = self.call_counts(branch_id, range);
        let previous = self.call_counts(branch_id, &range.previous());

        CallTrends {
            call_started: trend_percentage(current.call_started as f64, previous.call_started as f64),
            appointment_calls: trend_percentage(
                current.appointment_calls as f64,
                previous.appointment_calls as f64,
            ),
            meeting_calls: trend_percentage(
                current.meeting_calls as f64,
                previous.meeting_calls as f64,
            ),
            duration_minutes: trend_percentage(current.duration_minutes, previous.duration_minutes),
        }
    }

    // ─── Demo data ─────────────────────────────────────────────────────────

    /// Seed a demo organization with leads, prompts, and a few weeks of
    /// analytics events so the dashboard has something to show.
    pub fn seed_demo_data(&self) {
        use chrono::Duration;
        let now = Utc::now();

        let organization = self.create_organization("Acme Life Insurance");
        let branch = self.create_branch(organization.id, "Head Office");
        let user = self.create_user(
            organization.id,
            "demo@salescoach.io",
            &auth::hash_password("demo1234"),
            "Demo Manager",
            Role::Admin,
            Some(branch.id),
        );

        info!(
            branch_id = %branch.id,
            email = %user.email,
            "Demo data seeded (password: demo1234)"
        );

        // Leads at various pipeline stages.
        let leads = vec![
            ("Ravi Kumar", LeadStatus::YetToContact),
            ("Anita Desai", LeadStatus::YetToContact),
            ("Suresh Patel", LeadStatus::ContactedDropped),
            ("Meena Iyer", LeadStatus::FirstMeetingScheduled),
            ("Vikram Singh", LeadStatus::FirstMeetingCompleted),
            ("Priya Sharma", LeadStatus::SecondMeetingScheduled),
            ("Arjun Nair", LeadStatus::CallClosed),
        ];

        for (name, status) in leads {
            let response = self.create_lead(
                CreateLeadRequest {
                    branch_id: branch.id,
                    lead_type: LeadType::Suspect,
                    profile: ProfileDetails {
                        full_name: Some(name.to_string()),
                        city: Some("Mumbai".to_string()),
                        age: Some("30-40".to_string()),
                        income_range: Some("10-15 LPA".to_string()),
                        ..ProfileDetails::default()
                    },
                    known_to_agent: None,
                },
                &user,
            );
            if status != LeadStatus::YetToContact {
                self.update_lead(
                    response.lead.id,
                    UpdateLeadRequest {
                        status: Some(status),
                        ..UpdateLeadRequest::default()
                    },
                    &user,
                );
            }
        }

        // Prompts for the two call types.
        self.create_prompt(
            CreatePromptRequest {
                branch_id: branch.id,
                name: "Skeptical first contact".to_string(),
                text: "You are a busy professional who distrusts cold calls. \
                       Stay polite but keep raising objections about cost."
                    .to_string(),
                description: "Cold-call persona for appointment practice".to_string(),
                report_prompt_text: Some(
                    "Rate the agent's objection handling and closing.".to_string(),
                ),
                known_to_agent: None,
                meeting_status: Some(LeadStatus::YetToContact),
            },
            &user,
        );
        self.create_prompt(
            CreatePromptRequest {
                branch_id: branch.id,
                name: "Warm referral meeting".to_string(),
                text: "You were referred by a friend and are open to a plan, \
                       but want the numbers explained slowly."
                    .to_string(),
                description: "Referral persona for meeting practice".to_string(),
                report_prompt_text: None,
                known_to_agent: Some("Referred by existing customer".to_string()),
                meeting_status: Some(LeadStatus::FirstMeetingScheduled),
            },
            &user,
        );

        // A spread of practice calls over the last two weeks for the graphs.
        for days_ago in (1..=14).rev() {
            let at = now - Duration::days(days_ago);
            let call_type = if days_ago % 3 == 0 {
                CallType::MeetingCall
            } else {
                CallType::AppointmentCall
            };
            self.record_event_at(
                EventKind::CallStarted,
                json!({
                    "call_id": Uuid::new_v4(),
                    "user_id": user.id,
                    "lead_id": Uuid::new_v4(),
                    "call_type": call_type,
                }),
                branch.id,
                organization.id,
                at,
            );
            self.record_event_at(
                EventKind::CallEnded,
                json!({
                    "call_id": Uuid::new_v4(),
                    "duration_seconds": 180 + days_ago * 30,
                }),
                branch.id,
                organization.id,
                at,
            );
        }
    }
}

impl Default for CoachStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use coach_reporting::date_range::DatePreset;

    fn store_with_user() -> (CoachStore, Branch, User) {
        let store = CoachStore::new();
        let organization = store.create_organization("Test Org");
        let branch = store.create_branch(organization.id, "Test Branch");
        let user = store.create_user(
            organization.id,
            "tester@example.com",
            &auth::hash_password("secret123"),
            "Test User",
            Role::Admin,
            Some(branch.id),
        );
        (store, branch, user)
    }

    fn lead_request(branch_id: Uuid) -> CreateLeadRequest {
        CreateLeadRequest {
            branch_id,
            lead_type: LeadType::Suspect,
            profile: ProfileDetails {
                full_name: Some("Test Lead".to_string()),
                ..ProfileDetails::default()
            },
            known_to_agent: None,
        }
    }

    fn last_7_days() -> DateRange {
        DateRange::from_preset(DatePreset::Last7Days, Utc::now())
    }

    #[test]
    fn lead_crud_round_trip() {
        let (store, branch, user) = store_with_user();

        let created = store.create_lead(lead_request(branch.id), &user);
        assert_eq!(created.lead.status, LeadStatus::YetToContact);
        assert_eq!(created.profile.details.full_name.as_deref(), Some("Test Lead"));

        let listed = store.list_leads(branch.id, &user);
        assert_eq!(listed.len(), 1);

        let updated = store
            .update_lead(
                created.lead.id,
                UpdateLeadRequest {
                    status: Some(LeadStatus::FirstMeetingScheduled),
                    ..UpdateLeadRequest::default()
                },
                &user,
            )
            .unwrap();
        assert_eq!(updated.lead.status, LeadStatus::FirstMeetingScheduled);

        assert!(store.delete_lead(created.lead.id, &user));
        assert!(store.get_lead(created.lead.id, &user).is_none());
        assert!(store.list_leads(branch.id, &user).is_empty());
    }

    #[test]
    fn managers_only_see_their_own_leads() {
        let (store, branch, admin) = store_with_user();
        let manager = store.create_user(
            branch.organization_id,
            "manager@example.com",
            &auth::hash_password("secret123"),
            "Branch Manager",
            Role::Manager,
            Some(branch.id),
        );

        let admin_lead = store.create_lead(lead_request(branch.id), &admin);
        let manager_lead = store.create_lead(lead_request(branch.id), &manager);

        assert_eq!(store.list_leads(branch.id, &admin).len(), 2);
        let visible = store.list_leads(branch.id, &manager);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].lead.id, manager_lead.lead.id);

        assert!(store.get_lead(admin_lead.lead.id, &admin).is_some());
        assert!(store.get_lead(admin_lead.lead.id, &manager).is_none());
        assert!(store
            .update_lead(
                admin_lead.lead.id,
                UpdateLeadRequest {
                    status: Some(LeadStatus::CallClosed),
                    ..UpdateLeadRequest::default()
                },
                &manager,
            )
            .is_none());
        assert!(!store.delete_lead(admin_lead.lead.id, &manager));
        assert!(store.delete_lead(admin_lead.lead.id, &admin));
    }

    #[test]
    fn leads_are_not_visible_across_organizations() {
        let (store, branch, user) = store_with_user();
        let lead = store.create_lead(lead_request(branch.id), &user);

        let other_org = store.create_organization("Other Org");
        let other_branch = store.create_branch(other_org.id, "Other Branch");
        let outsider = store.create_user(
            other_org.id,
            "outsider@example.com",
            &auth::hash_password("secret123"),
            "Outsider",
            Role::Admin,
            Some(other_branch.id),
        );

        assert!(store.get_lead(lead.lead.id, &outsider).is_none());
        assert!(store.list_leads(branch.id, &outsider).is_empty());
        assert!(!store.delete_lead(lead.lead.id, &outsider));
        assert!(store
            .create_call(
                CreateCallRequest {
                    lead_id: lead.lead.id,
                    prompt_id: None,
                    call_type: CallType::AppointmentCall,
                },
                &outsider,
            )
            .is_none());
    }

    #[test]
    fn lead_creation_feeds_the_suspect_stage() {
        let (store, branch, user) = store_with_user();
        store.create_lead(lead_request(branch.id), &user);

        let counts = store.funnel_counts(branch.id, &last_7_days());
        assert_eq!(counts[&FunnelStageKey::LeadCreatedSuspect], 1);
        assert_eq!(counts[&FunnelStageKey::LeadStatusYetToContact], 0);
    }

    #[test]
    fn repeated_status_updates_count_one_distinct_lead() {
        let (store, branch, user) = store_with_user();
        let lead = store.create_lead(lead_request(branch.id), &user);

        for _ in 0..2 {
            store.update_lead(
                lead.lead.id,
                UpdateLeadRequest {
                    status: Some(LeadStatus::ContactedDropped),
                    ..UpdateLeadRequest::default()
                },
                &user,
            );
            store.update_lead(
                lead.lead.id,
                UpdateLeadRequest {
                    status: Some(LeadStatus::YetToContact),
                    ..UpdateLeadRequest::default()
                },
                &user,
            );
        }

        let counts = store.funnel_counts(branch.id, &last_7_days());
        assert_eq!(counts[&FunnelStageKey::LeadStatusContactedDropped], 1);
        assert_eq!(counts[&FunnelStageKey::LeadStatusYetToContact], 1);
    }

    #[test]
    fn funnel_counts_respect_the_window() {
        let (store, branch, _user) = store_with_user();
        let old = Utc::now() - Duration::days(30);
        store.record_event_at(
            EventKind::LeadCreated,
            json!({"lead_id": Uuid::new_v4(), "lead_type": "suspect"}),
            branch.id,
            branch.organization_id,
            old,
        );

        let counts = store.funnel_counts(branch.id, &last_7_days());
        assert_eq!(counts[&FunnelStageKey::LeadCreatedSuspect], 0);
    }

    #[test]
    fn funnel_counts_are_branch_scoped() {
        let (store, branch, user) = store_with_user();
        let other_branch = store.create_branch(branch.organization_id, "Other");
        store.create_lead(lead_request(branch.id), &user);

        let counts = store.funnel_counts(other_branch.id, &last_7_days());
        assert_eq!(counts[&FunnelStageKey::LeadCreatedSuspect], 0);
    }

    #[test]
    fn call_lifecycle_records_events_and_duration() {
        let (store, branch, user) = store_with_user();
        let lead = store.create_lead(lead_request(branch.id), &user);

        let response = store
            .create_call(
                CreateCallRequest {
                    lead_id: lead.lead.id,
                    prompt_id: None,
                    call_type: CallType::AppointmentCall,
                },
                &user,
            )
            .unwrap();
        assert!(response.call.transcript.is_none());
        assert_eq!(response.profile_snapshot.lead_id, lead.lead.id);

        let completed = store
            .complete_call(
                response.call.id,
                CompleteCallRequest {
                    transcript: "User: hello\nAgent: hi".to_string(),
                    duration_seconds: 240,
                    report: None,
                },
                &user,
            )
            .unwrap();
        assert_eq!(completed.duration_seconds, Some(240));

        let counts = store.call_counts(branch.id, &last_7_days());
        assert_eq!(counts.call_started, 1);
        assert_eq!(counts.appointment_calls, 1);
        assert_eq!(counts.meeting_calls, 0);
        assert!((counts.duration_minutes - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn call_for_missing_lead_is_none() {
        let (store, _branch, user) = store_with_user();
        let response = store.create_call(
            CreateCallRequest {
                lead_id: Uuid::new_v4(),
                prompt_id: None,
                call_type: CallType::MeetingCall,
            },
            &user,
        );
        assert!(response.is_none());
    }

    #[test]
    fn calls_are_scoped_to_role_and_organization() {
        let (store, branch, admin) = store_with_user();
        let manager = store.create_user(
            branch.organization_id,
            "manager@example.com",
            &auth::hash_password("secret123"),
            "Branch Manager",
            Role::Manager,
            Some(branch.id),
        );
        let lead = store.create_lead(lead_request(branch.id), &admin);

        let call_request = || CreateCallRequest {
            lead_id: lead.lead.id,
            prompt_id: None,
            call_type: CallType::AppointmentCall,
        };
        let admin_call = store.create_call(call_request(), &admin).unwrap();
        let manager_call = store.create_call(call_request(), &manager).unwrap();

        assert_eq!(store.list_calls(branch.id, &admin).len(), 2);
        let visible = store.list_calls(branch.id, &manager);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].call.id, manager_call.call.id);

        assert!(store.get_call(admin_call.call.id, &admin).is_some());
        assert!(store.get_call(admin_call.call.id, &manager).is_none());
        // The provider's delivery is accepted from either role in the org.
        assert!(store
            .complete_call(
                admin_call.call.id,
                CompleteCallRequest {
                    transcript: "User: hi".to_string(),
                    duration_seconds: 30,
                    report: None,
                },
                &manager,
            )
            .is_some());

        let other_org = store.create_organization("Other Org");
        let outsider = store.create_user(
            other_org.id,
            "outsider@example.com",
            &auth::hash_password("secret123"),
            "Outsider",
            Role::Admin,
            None,
        );
        assert!(store.get_call(admin_call.call.id, &outsider).is_none());
        assert!(store.list_calls(branch.id, &outsider).is_empty());
        assert!(store
            .complete_call(
                manager_call.call.id,
                CompleteCallRequest {
                    transcript: "User: hi".to_string(),
                    duration_seconds: 30,
                    report: None,
                },
                &outsider,
            )
            .is_none());
    }

    #[test]
    fn call_graph_groups_by_day_ascending() {
        let (store, branch, _user) = store_with_user();
        let now = Utc::now();

        for days_ago in [3, 1, 2, 1] {
            store.record_event_at(
                EventKind::CallStarted,
                json!({"call_id": Uuid::new_v4()}),
                branch.id,
                branch.organization_id,
                now - Duration::days(days_ago),
            );
        }

        let (call_counts, durations) = store.call_graph(branch.id, &last_7_days());
        assert_eq!(call_counts.len(), 3);
        assert!(call_counts.windows(2).all(|w| w[0].event_date < w[1].event_date));
        // Two calls on the same day collapse into one point.
        assert_eq!(call_counts[2].metric_value, 2.0);
        assert!(durations.is_empty());
    }

    #[test]
    fn trends_compare_against_the_previous_window() {
        let (store, branch, _user) = store_with_user();
        let now = Utc::now();

        // One suspect in the previous window, two in the current one.
        store.record_event_at(
            EventKind::LeadCreated,
            json!({"lead_id": Uuid::new_v4(), "lead_type": "suspect"}),
            branch.id,
            branch.organization_id,
            now - Duration::days(10),
        );
        for days_ago in [1, 2] {
            store.record_event_at(
                EventKind::LeadCreated,
                json!({"lead_id": Uuid::new_v4(), "lead_type": "suspect"}),
                branch.id,
                branch.organization_id,
                now - Duration::days(days_ago),
            );
        }

        let trends = store.funnel_trends(branch.id, &last_7_days());
        assert_eq!(trends[&FunnelStageKey::LeadCreatedSuspect], 100.0);
        assert_eq!(trends[&FunnelStageKey::CallClosed], 0.0);
    }

    #[test]
    fn call_trends_use_the_zero_previous_rule() {
        let (store, branch, _user) = store_with_user();
        store.record_event_at(
            EventKind::CallStarted,
            json!({"call_id": Uuid::new_v4(), "call_type": "meeting_call"}),
            branch.id,
            branch.organization_id,
            Utc::now() - Duration::days(1),
        );

        let trends = store.call_trends(branch.id, &last_7_days());
        assert_eq!(trends.call_started, 100.0);
        assert_eq!(trends.appointment_calls, 0.0);
    }

    #[test]
    fn expired_sessions_are_rejected() {
        let (store, _branch, user) = store_with_user();

        store.create_session("sc_live", user.id, Utc::now() + Duration::hours(1));
        store.create_session("sc_stale", user.id, Utc::now() - Duration::hours(1));

        assert!(store.validate_session("sc_live").is_some());
        assert!(store.validate_session("sc_stale").is_none());
        assert!(store.validate_session("sc_unknown").is_none());
    }

    #[test]
    fn seeded_demo_data_is_queryable() {
        let store = CoachStore::new();
        store.seed_demo_data();

        let user = store.find_user_by_email("demo@salescoach.io").unwrap();
        let branch = store.list_branches(user.organization_id)[0].clone();

        assert_eq!(store.list_leads(branch.id, &user).len(), 7);
        assert_eq!(store.list_prompts(branch.id).len(), 2);

        let range = DateRange::from_preset(DatePreset::Last30Days, Utc::now());
        let counts = store.funnel_counts(branch.id, &range);
        assert!(counts[&FunnelStageKey::LeadCreatedSuspect] >= 7);

        let (call_counts, durations) = store.call_graph(branch.id, &range);
        assert!(!call_counts.is_empty());
        assert!(!durations.is_empty());
    }
}
