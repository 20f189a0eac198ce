//! Time-series bucketing for the call-volume and call-duration charts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single day's metric value as produced by the event-log scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub event_date: NaiveDate,
    pub metric_value: f64,
}

/// A chart-ready point with its x-axis label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub event_date: NaiveDate,
    pub metric_value: f64,
    pub axis_label: String,
}

/// Take the most recent `n` entries of the series — by original position,
/// not by date — then sort ascending by date for charting.
///
/// Tail-before-sort is load-bearing: append-only feeds are trimmed to their
/// newest appended records even when they arrive unsorted, so the two steps
/// must not be swapped. Duplicate dates are kept, not merged; the stable
/// sort preserves their tail order.
pub fn bucket_last_n(series: &[TimeSeriesPoint], n: usize) -> Vec<ChartPoint> {
    let tail_start = series.len().saturating_sub(n);
    let mut window: Vec<TimeSeriesPoint> = series[tail_start..].to_vec();
    window.sort_by_key(|point| point.event_date);

    window
        .into_iter()
        .map(|point| ChartPoint {
            axis_label: point.event_date.format("%-d %b").to_string(),
            event_date: point.event_date,
            metric_value: point.metric_value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(y: i32, m: u32, d: u32, value: f64) -> TimeSeriesPoint {
        TimeSeriesPoint {
            event_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            metric_value: value,
        }
    }

    #[test]
    fn output_length_is_min_of_n_and_input_length() {
        let series = vec![
            point(2024, 5, 1, 1.0),
            point(2024, 5, 2, 2.0),
            point(2024, 5, 3, 3.0),
        ];

        assert_eq!(bucket_last_n(&series, 2).len(), 2);
        assert_eq!(bucket_last_n(&series, 3).len(), 3);
        assert_eq!(bucket_last_n(&series, 10).len(), 3);
        assert_eq!(bucket_last_n(&series, 0).len(), 0);
        assert_eq!(bucket_last_n(&[], 5).len(), 0);
    }

    #[test]
    fn output_is_sorted_ascending_by_date() {
        let series = vec![
            point(2024, 5, 3, 3.0),
            point(2024, 5, 1, 1.0),
            point(2024, 5, 2, 2.0),
        ];

        let bucketed = bucket_last_n(&series, 3);
        let dates: Vec<NaiveDate> = bucketed.iter().map(|p| p.event_date).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn tail_is_taken_before_sorting() {
        // The chronologically-latest entry sits first, so tail-then-sort
        // drops it while sort-then-tail would keep it.
        let series = vec![
            point(2024, 5, 9, 9.0),
            point(2024, 5, 1, 1.0),
            point(2024, 5, 2, 2.0),
        ];

        let bucketed = bucket_last_n(&series, 2);
        assert_eq!(
            bucketed[0].event_date,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert_eq!(
            bucketed[1].event_date,
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
        );
    }

    #[test]
    fn rebucketing_identical_input_is_idempotent() {
        let series = vec![
            point(2024, 5, 3, 3.0),
            point(2024, 5, 1, 1.0),
            point(2024, 5, 2, 2.0),
        ];

        assert_eq!(bucket_last_n(&series, 2), bucket_last_n(&series, 2));
    }

    #[test]
    fn duplicate_dates_are_kept() {
        let series = vec![point(2024, 5, 1, 1.0), point(2024, 5, 1, 4.0)];

        let bucketed = bucket_last_n(&series, 5);
        assert_eq!(bucketed.len(), 2);
        assert_eq!(bucketed[0].metric_value, 1.0);
        assert_eq!(bucketed[1].metric_value, 4.0);
    }

    #[test]
    fn axis_labels_use_day_and_short_month() {
        let bucketed = bucket_last_n(&[point(2024, 8, 4, 1.0)], 1);
        assert_eq!(bucketed[0].axis_label, "4 Aug");
    }
}
