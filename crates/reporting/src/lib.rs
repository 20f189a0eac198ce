//! Dashboard analytics transforms — date-range resolution, funnel
//! aggregation, time-series bucketing, and transcript parsing.
//!
//! Everything here is a pure, synchronous function of its inputs: no clock,
//! no store, no I/O. The management layer feeds these from its event log.

pub mod date_range;
pub mod funnel;
pub mod timeseries;
pub mod transcript;
pub mod trend;

pub use date_range::{DatePreset, DateRange};
pub use funnel::{FunnelStage, FunnelStageKey};
pub use timeseries::{ChartPoint, TimeSeriesPoint};
pub use transcript::TranscriptTurn;
pub use trend::trend_percentage;
