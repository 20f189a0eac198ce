//! Date-range resolution for the dashboard's period picker.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The fixed preset offsets offered by the dashboard period picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePreset {
    Yesterday,
    Last7Days,
    Last14Days,
    Last30Days,
    Last90Days,
}

impl DatePreset {
    /// Signed day offset applied to "now" to obtain the window start.
    pub fn offset_days(&self) -> i64 {
        match self {
            DatePreset::Yesterday => -1,
            DatePreset::Last7Days => -7,
            DatePreset::Last14Days => -14,
            DatePreset::Last30Days => -30,
            DatePreset::Last90Days => -90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DatePreset::Yesterday => "Yesterday",
            DatePreset::Last7Days => "Last 7 days",
            DatePreset::Last14Days => "Last 14 days",
            DatePreset::Last30Days => "Last 30 days",
            DatePreset::Last90Days => "Last 90 days",
        }
    }
}

/// A resolved reporting window with a display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

impl DateRange {
    /// Resolve a preset against an explicit reference instant. The window
    /// always ends at `now`.
    pub fn from_preset(preset: DatePreset, now: DateTime<Utc>) -> Self {
        let start = now + Duration::days(preset.offset_days());
        Self {
            start,
            end: now,
            label: format!(
                "{} - {} - {}",
                preset.label(),
                format_boundary(start),
                format_boundary(now)
            ),
        }
    }

    /// Resolve an explicit anchor date; the window ends at `now`. A future
    /// anchor produces `start > end` as given — ordering is the caller's
    /// concern.
    pub fn from_anchor(anchor: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_bounds(anchor, now)
    }

    /// An explicit window. Boundaries are taken as given, in either order.
    pub fn from_bounds(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            label: format!("{} - {}", format_boundary(start), format_boundary(end)),
        }
    }

    /// Window length, used to derive the previous comparison window.
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// The same-length window immediately preceding this one.
    pub fn previous(&self) -> Self {
        let span = self.span();
        let start = self.start - span;
        let end = self.end - span;
        Self {
            start,
            end,
            label: format!("{} - {}", format_boundary(start), format_boundary(end)),
        }
    }
}

fn format_boundary(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}
