// ── Trend chart transform ──
//
// Turns a list of status samples into index-aligned chart series with
// per-range time labels. Derived data only: the dashboard store rebuilds
// the series wholesale on every history fetch.

use crate::model::{ChartSeries, PoolStatus, TimeRange};

/// Format a sample's timestamp for the given range.
///
/// Short ranges label by clock time, 7d by weekday, 30d by month-day.
fn format_label(status: &PoolStatus, range: TimeRange) -> String {
    let Some(ts) = status.last_updated else {
        return String::new();
    };
    let pattern = match range {
        TimeRange::Hour1 | TimeRange::Day1 => "%H:%M",
        TimeRange::Week7 => "%a",
        TimeRange::Month30 => "%m-%d",
    };
    ts.format(pattern).to_string()
}

/// Build the chart series for a trend response.
///
/// Returns `None` when there are no samples, so the chart slot can be
/// blanked instead of holding an all-empty series.
pub fn build_series(records: &[PoolStatus], range: TimeRange) -> Option<ChartSeries> {
    if records.is_empty() {
        return None;
    }

    let mut series = ChartSeries {
        labels: Vec::with_capacity(records.len()),
        valid: Vec::with_capacity(records.len()),
        invalid: Vec::with_capacity(records.len()),
        cooling: Vec::with_capacity(records.len()),
        pressure: Vec::with_capacity(records.len()),
    };

    for record in records {
        series.labels.push(format_label(record, range));
        series.valid.push(record.valid_count);
        series.invalid.push(record.invalid_count);
        series.cooling.push(record.cooling_count);
        series.pressure.push(record.pressure.unwrap_or(0.0));
    }

    Some(series)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::PoolId;
    use chrono::{TimeZone, Utc};

    fn sample(hour: u32, valid: i64, pressure: Option<f64>) -> PoolStatus {
        PoolStatus {
            pool_id: PoolId::new("1"),
            pool_name: None,
            valid_count: valid,
            invalid_count: 1,
            cooling_count: 2,
            total_count: valid + 3,
            pressure,
            last_updated: Some(Utc.with_ymd_and_hms(2024, 6, 3, hour, 15, 0).unwrap()),
        }
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(build_series(&[], TimeRange::Day1).is_none());
    }

    #[test]
    fn series_are_index_aligned() {
        let records = vec![sample(8, 10, Some(42.5)), sample(9, 12, None)];
        let series = build_series(&records, TimeRange::Day1).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.labels, vec!["08:15", "09:15"]);
        assert_eq!(series.valid, vec![10, 12]);
        assert_eq!(series.invalid, vec![1, 1]);
        assert_eq!(series.cooling, vec![2, 2]);
        assert_eq!(series.pressure, vec![42.5, 0.0]);
    }

    #[test]
    fn labels_follow_the_range() {
        let records = vec![sample(8, 1, None)];

        // 2024-06-03 is a Monday.
        let weekly = build_series(&records, TimeRange::Week7).unwrap();
        assert_eq!(weekly.labels, vec!["Mon"]);

        let monthly = build_series(&records, TimeRange::Month30).unwrap();
        assert_eq!(monthly.labels, vec!["06-03"]);

        let hourly = build_series(&records, TimeRange::Hour1).unwrap();
        assert_eq!(hourly.labels, vec!["08:15"]);
    }

    #[test]
    fn missing_timestamp_gets_empty_label() {
        let mut record = sample(8, 1, None);
        record.last_updated = None;
        let series = build_series(&[record], TimeRange::Day1).unwrap();
        assert_eq!(series.labels, vec![""]);
    }
}
