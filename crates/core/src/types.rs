//! Shared domain vocabulary — lead lifecycle enums, call classification,
//! roles, analytics event kinds, and the decoded call-report schema.

use serde::{Deserialize, Serialize};

// ─── Lead lifecycle ────────────────────────────────────────────────────────

/// Qualification level of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadType {
    Suspect,
    Prospect,
}

impl Default for LeadType {
    fn default() -> Self {
        LeadType::Suspect
    }
}

/// Pipeline status of a lead. The wire representation uses the display
/// strings the dashboard renders; the analytics event log matches on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    #[serde(rename = "Yet to Contact")]
    YetToContact,
    #[serde(rename = "Contacted & Dropped")]
    ContactedDropped,
    #[serde(rename = "1st Meeting Scheduled")]
    FirstMeetingScheduled,
    #[serde(rename = "1st Meeting Completed")]
    FirstMeetingCompleted,
    #[serde(rename = "2nd Meeting Scheduled")]
    SecondMeetingScheduled,
    #[serde(rename = "Call Closed")]
    CallClosed,
}

impl Default for LeadStatus {
    fn default() -> Self {
        LeadStatus::YetToContact
    }
}

// ─── Calls and prompts ─────────────────────────────────────────────────────

/// What the practice call is rehearsing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    AppointmentCall,
    MeetingCall,
}

impl Default for CallType {
    fn default() -> Self {
        CallType::AppointmentCall
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptType {
    Conversation,
}

impl Default for PromptType {
    fn default() -> Self {
        PromptType::Conversation
    }
}

// ─── Access control ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
}

// ─── Analytics events ──────────────────────────────────────────────────────

/// Event names recorded in the analytics log. Funnel and call metrics are
/// computed by scanning these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    LeadCreated,
    LeadStatusUpdated,
    LeadTypeUpdated,
    CallStarted,
    CallEnded,
}

// ─── Call-report schema ────────────────────────────────────────────────────
//
// `Call.report` arrives as a JSON-encoded string from the external report
// generator. It is decoded into these types at the API boundary; a payload
// that does not match is a decode error, not a loosely-indexed blob.

/// Rating scale used across all report metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingScale {
    Excellent,
    Good,
    Average,
    Bad,
}

/// Per-dimension ratings of the trainee's performance on the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallCallMetrics {
    pub performance: RatingScale,
    pub professionalism: RatingScale,
    pub confidence: RatingScale,
    pub energy_level: RatingScale,
    pub clarity: RatingScale,
}

/// Free-form feedback lists from the report generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallFeedback {
    pub positives: Vec<String>,
    pub improvements: Vec<String>,
    #[serde(default)]
    pub general_comments: Vec<String>,
}

/// A decoded practice-call report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallReport {
    pub overall_call_metrics: OverallCallMetrics,
    pub call_feedback: CallFeedback,
}
