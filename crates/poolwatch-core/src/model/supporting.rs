// ── Supporting domain types ──
//
// Pagination, overview totals, chart series, and the time-range tokens
// shared by the trend endpoint and the chart transform.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::pool::{Pool, PoolStatus};

// ── Pagination ──────────────────────────────────────────────────────

/// Server-side pagination state for the pool directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page index.
    pub current: u64,
    pub size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current: 1,
            size: 10,
            total: 0,
            total_pages: 0,
        }
    }
}

// ── OverviewStats ───────────────────────────────────────────────────

/// Aggregate totals across all pools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewStats {
    pub total_pools: i64,
    pub active_pools: i64,
    pub total_valid_count: i64,
    pub total_invalid_count: i64,
    pub total_cooling_count: i64,
    pub total_count: i64,
    pub avg_pressure: Option<f64>,
}

// ── ChartSeries ─────────────────────────────────────────────────────

/// Index-aligned series for the trend chart.
///
/// Derived data: rebuilt wholesale on every history fetch, never
/// patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub valid: Vec<i64>,
    pub invalid: Vec<i64>,
    pub cooling: Vec<i64>,
    pub pressure: Vec<f64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ── TimeRange ───────────────────────────────────────────────────────

/// History window for the trend endpoint.
///
/// The strum tokens are the exact strings the backend accepts as the
/// `timeRange` query parameter.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[non_exhaustive]
pub enum TimeRange {
    #[strum(serialize = "1h")]
    #[serde(rename = "1h")]
    Hour1,
    #[default]
    #[strum(serialize = "24h")]
    #[serde(rename = "24h")]
    Day1,
    #[strum(serialize = "7d")]
    #[serde(rename = "7d")]
    Week7,
    #[strum(serialize = "30d")]
    #[serde(rename = "30d")]
    Month30,
}

impl TimeRange {
    /// Parse a range token, falling back to the 24h default.
    pub fn parse(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// Width of the window ending at fetch time.
    pub fn window(self) -> Duration {
        match self {
            Self::Hour1 => Duration::hours(1),
            Self::Day1 => Duration::hours(24),
            Self::Week7 => Duration::days(7),
            Self::Month30 => Duration::days(30),
        }
    }
}

// ── PoolWithStatus ──────────────────────────────────────────────────

/// A pool joined with its freshest status sample, as published by the
/// dashboard store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolWithStatus {
    pub pool: Pool,
    pub status: Option<PoolStatus>,
}

// ── DataSourceType ──────────────────────────────────────────────────

/// A backend-registered pool data source implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceType {
    pub name: String,
    pub description: Option<String>,
    pub class_full_name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn time_range_tokens() {
        assert_eq!(TimeRange::Hour1.to_string(), "1h");
        assert_eq!(TimeRange::Day1.to_string(), "24h");
        assert_eq!(TimeRange::Week7.to_string(), "7d");
        assert_eq!(TimeRange::Month30.to_string(), "30d");
    }

    #[test]
    fn time_range_parse_defaults_to_24h() {
        assert_eq!(TimeRange::parse("7d"), TimeRange::Week7);
        assert_eq!(TimeRange::parse("nonsense"), TimeRange::Day1);
        assert_eq!(TimeRange::default(), TimeRange::Day1);
    }

    #[test]
    fn time_range_windows() {
        assert_eq!(TimeRange::Hour1.window(), Duration::hours(1));
        assert_eq!(TimeRange::Month30.window(), Duration::days(30));
    }

    #[test]
    fn pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.current, 1);
        assert_eq!(p.size, 10);
    }
}
