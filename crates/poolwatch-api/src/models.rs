// Wire-level DTOs for the dashboard backend.
//
// Field names mirror the backend's camelCase JSON. Identifier fields
// accept either a JSON string (post-rewrite snowflakes) or an integer
// (small ids the rewrite leaves untouched); both land as `String`.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

// ── Identifier plumbing ─────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(i64),
    Str(String),
}

impl From<NumOrStr> for String {
    fn from(v: NumOrStr) -> Self {
        match v {
            NumOrStr::Num(n) => n.to_string(),
            NumOrStr::Str(s) => s,
        }
    }
}

/// Deserialize an id that may arrive as a bare integer or a string.
pub(crate) fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    NumOrStr::deserialize(d).map(String::from)
}

/// Like [`id_string`] but optional.
pub(crate) fn opt_id_string<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<String>, D::Error> {
    Option::<NumOrStr>::deserialize(d).map(|v| v.map(String::from))
}

/// A list of ids, each an integer or a string.
pub(crate) fn id_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<Vec<NumOrStr>>::deserialize(d)?;
    Ok(raw.unwrap_or_default().into_iter().map(String::from).collect())
}

/// Deserialize a pressure value that may arrive as a number or a
/// stringified decimal (the backend serializes `BigDecimal`).
pub(crate) fn decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Str(String),
    }
    match Option::<Raw>::deserialize(d)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) => s.parse().map(Some).map_err(de::Error::custom),
    }
}

// ── Envelope ────────────────────────────────────────────────────────

/// The backend's uniform response wrapper `{code, data, message}`.
///
/// `message` and `data` deserialize to `None` when absent; no
/// `#[serde(default)]` so the derive stays free of a `T: Default` bound.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Page envelope for list endpoints.
///
/// `records` is optional on the wire so callers can distinguish a
/// malformed page (missing array) from an empty one.
#[derive(Debug, Deserialize)]
pub struct PageDto<T> {
    pub records: Option<Vec<T>>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub pages: u64,
}

// ── Pools ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDto {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "decimal")]
    pub pressure: Option<f64>,
    #[serde(default, rename = "type", alias = "poolType")]
    pub pool_type: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub display_strategy: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub create_time: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub update_time: Option<String>,
}

/// Body for create/update pool requests.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolWrite {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub pool_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_strategy: Option<String>,
}

// ── Pool status ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatusDto {
    #[serde(default, deserialize_with = "opt_id_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "id_string")]
    pub pool_id: String,
    #[serde(default)]
    pub pool_name: Option<String>,
    #[serde(default)]
    pub valid_count: Option<i64>,
    #[serde(default)]
    pub invalid_count: Option<i64>,
    #[serde(default)]
    pub cooling_count: Option<i64>,
    #[serde(default)]
    pub total_count: Option<i64>,
    #[serde(default, deserialize_with = "decimal")]
    pub pressure: Option<f64>,
    /// Epoch milliseconds of the sample.
    #[serde(default, alias = "timestamp", alias = "lastUpdated")]
    pub record_time: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStatsDto {
    #[serde(default)]
    pub total_pools: Option<i64>,
    #[serde(default)]
    pub active_pools: Option<i64>,
    #[serde(default)]
    pub total_valid_count: Option<i64>,
    #[serde(default)]
    pub total_invalid_count: Option<i64>,
    #[serde(default)]
    pub total_cooling_count: Option<i64>,
    #[serde(default)]
    pub total_count: Option<i64>,
    #[serde(default, deserialize_with = "decimal")]
    pub avg_pressure: Option<f64>,
}

/// Query window for the trend endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendQuery {
    pub time_range: String,
    pub start_time: i64,
    pub end_time: i64,
}

// ── Virtual pools ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualPoolDto {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "id_list")]
    pub pool_ids: Vec<String>,
    #[serde(default, alias = "aggregateStrategy")]
    pub strategy: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default, alias = "createdAt")]
    pub create_time: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualPoolWrite {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pool_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub username: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

// ── System ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceTypeDto {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub class_full_name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pool_id_accepts_number_or_string() {
        let from_num: PoolDto = serde_json::from_str(r#"{"id": 7, "name": "a"}"#).unwrap();
        assert_eq!(from_num.id, "7");

        let from_str: PoolDto =
            serde_json::from_str(r#"{"id": "12345678901234567", "name": "a"}"#).unwrap();
        assert_eq!(from_str.id, "12345678901234567");
    }

    #[test]
    fn virtual_pool_ids_accept_mixed_forms() {
        let dto: VirtualPoolDto = serde_json::from_str(
            r#"{"id": 1, "name": "v", "poolIds": [3, "12345678901234567"]}"#,
        )
        .unwrap();
        assert_eq!(dto.pool_ids, vec!["3", "12345678901234567"]);
    }

    #[test]
    fn pressure_accepts_stringified_decimal() {
        let dto: PoolStatusDto =
            serde_json::from_str(r#"{"poolId": 1, "pressure": "83.25"}"#).unwrap();
        assert_eq!(dto.pressure, Some(83.25));
    }

    #[test]
    fn page_distinguishes_missing_records() {
        let page: PageDto<PoolDto> =
            serde_json::from_str(r#"{"total": 0, "size": 10, "current": 1, "pages": 0}"#)
                .unwrap();
        assert!(page.records.is_none());
    }
}
