//! Funnel aggregation — turns raw stage counts and trend deltas into the
//! ordered, display-ready series the sales-funnel chart consumes.

use std::collections::HashMap;

use coach_core::types::LeadStatus;
use serde::{Deserialize, Serialize};

/// The seven canonical funnel stages, in pipeline order. Wire names match
/// the metrics endpoints' response keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStageKey {
    LeadCreatedSuspect,
    LeadStatusYetToContact,
    LeadStatusContactedDropped,
    FirstMeetingScheduled,
    FirstMeetingCompleted,
    SecondMeetingScheduled,
    CallClosed,
}

/// Canonical emission order. Output ordering is fixed by this list, never by
/// input key order.
pub const CANONICAL_ORDER: [FunnelStageKey; 7] = [
    FunnelStageKey::LeadCreatedSuspect,
    FunnelStageKey::LeadStatusYetToContact,
    FunnelStageKey::LeadStatusContactedDropped,
    FunnelStageKey::FirstMeetingScheduled,
    FunnelStageKey::FirstMeetingCompleted,
    FunnelStageKey::SecondMeetingScheduled,
    FunnelStageKey::CallClosed,
];

impl FunnelStageKey {
    pub fn label(&self) -> &'static str {
        match self {
            FunnelStageKey::LeadCreatedSuspect => "No. of Suspects",
            FunnelStageKey::LeadStatusYetToContact => "Yet to Contact",
            FunnelStageKey::LeadStatusContactedDropped => "Contacted & Dropped",
            FunnelStageKey::FirstMeetingScheduled => "1st Meeting Scheduled",
            FunnelStageKey::FirstMeetingCompleted => "1st Meeting Completed",
            FunnelStageKey::SecondMeetingScheduled => "2nd Meeting Scheduled",
            FunnelStageKey::CallClosed => "Call Closed",
        }
    }
}

/// The stage a lead-status transition feeds. Stage 0 is fed by lead
/// creation, not a status transition.
impl From<LeadStatus> for FunnelStageKey {
    fn from(status: LeadStatus) -> Self {
        match status {
            LeadStatus::YetToContact => FunnelStageKey::LeadStatusYetToContact,
            LeadStatus::ContactedDropped => FunnelStageKey::LeadStatusContactedDropped,
            LeadStatus::FirstMeetingScheduled => FunnelStageKey::FirstMeetingScheduled,
            LeadStatus::FirstMeetingCompleted => FunnelStageKey::FirstMeetingCompleted,
            LeadStatus::SecondMeetingScheduled => FunnelStageKey::SecondMeetingScheduled,
            LeadStatus::CallClosed => FunnelStageKey::CallClosed,
        }
    }
}

/// One display-ready funnel stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStage {
    pub index: usize,
    pub label: String,
    pub value: i64,
    pub trend: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// Merge stage counts and trend deltas into the ordered seven-stage series.
/// Missing keys default to zero; negative counts pass through unmodified.
pub fn aggregate(
    counts: &HashMap<FunnelStageKey, i64>,
    trends: &HashMap<FunnelStageKey, f64>,
) -> Vec<FunnelStage> {
    CANONICAL_ORDER
        .iter()
        .enumerate()
        .map(|(index, key)| FunnelStage {
            index,
            label: key.label().to_string(),
            value: counts.get(key).copied().unwrap_or(0),
            trend: trends.get(key).copied().unwrap_or(0.0),
            percentage: None,
        })
        .collect()
}

/// Express each stage as a percentage of stage 0, rounded to one decimal.
/// When stage 0 is zero every percentage is 0, never NaN or infinite.
pub fn with_percentages(stages: &[FunnelStage]) -> Vec<FunnelStage> {
    let base = stages.first().map(|s| s.value).unwrap_or(0);

    stages
        .iter()
        .map(|stage| {
            let percentage = if base == 0 {
                0.0
            } else {
                round_one_decimal(stage.value as f64 / base as f64 * 100.0)
            };
            FunnelStage {
                percentage: Some(percentage),
                ..stage.clone()
            }
        })
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
