// ── Pool domain types ──
//
// PoolId is the foundation of every domain type: a string-backed
// identifier that survives 64-bit backend snowflakes intact.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

// ── PoolId ──────────────────────────────────────────────────────────

/// Canonical identifier for pools and virtual pools.
///
/// Backed by a string so snowflake ids beyond `2^53` never touch a
/// float. Deserializes from either a JSON string (the post-rewrite
/// form) or a bare integer (small ids the rewrite leaves untouched).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PoolId(String);

impl PoolId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PoolId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<String> for PoolId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PoolId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl<'de> Deserialize<'de> for PoolId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Str(String),
        }
        Ok(match Raw::deserialize(d)? {
            Raw::Num(n) => Self(n.to_string()),
            Raw::Str(s) => Self(s),
        })
    }
}

// ── PoolHealth ──────────────────────────────────────────────────────

/// Pool operational health, normalized from the backend's free-form
/// status string. Anything unrecognized lands in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[non_exhaustive]
pub enum PoolHealth {
    Healthy,
    Degraded,
    Cooling,
    Offline,
    Unknown,
}

impl PoolHealth {
    /// Parse a backend status string, mapping anything unknown to
    /// [`PoolHealth::Unknown`].
    pub fn parse(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unknown)
    }

    pub fn is_offline(self) -> bool {
        matches!(self, Self::Offline)
    }
}

// ── Pool ────────────────────────────────────────────────────────────

/// A monitored pool as shown in the directory and dashboard views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub name: String,
    pub description: Option<String>,
    pub health: PoolHealth,
    /// Load pressure in percent, when the backend reports one.
    pub pressure: Option<f64>,
    pub pool_type: Option<String>,
    pub enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ── PoolStatus ──────────────────────────────────────────────────────

/// Latest status sample for a single pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    pub pool_id: PoolId,
    pub pool_name: Option<String>,
    pub valid_count: i64,
    pub invalid_count: i64,
    pub cooling_count: i64,
    pub total_count: i64,
    pub pressure: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}
