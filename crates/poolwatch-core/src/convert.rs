// ── API-to-domain type conversions ──
//
// Bridges raw `poolwatch_api` DTOs into canonical `poolwatch_core::model`
// types. Each `From` impl normalizes field names, parses strings into
// strong types, and fills sensible defaults for missing optional data.

use chrono::{DateTime, NaiveDateTime, Utc};

use poolwatch_api::models::{
    DataSourceTypeDto, OverviewStatsDto, PoolDto, PoolStatusDto, VirtualPoolDto,
};

use crate::model::{
    DataSourceType, OverviewStats, Pool, PoolHealth, PoolId, PoolStatus, SelectionStrategy,
    VirtualPool,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Parse a backend datetime string, silently dropping unparseable values.
///
/// The backend emits ISO-8601 local datetimes (`2024-06-01T12:30:00`);
/// older rows use a space separator. Both are treated as UTC.
fn parse_datetime(raw: Option<&String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Convert an epoch-milliseconds timestamp to `DateTime<Utc>`.
pub(crate) fn epoch_ms_to_datetime(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(DateTime::from_timestamp_millis)
}

// ── Pool ────────────────────────────────────────────────────────────

impl From<PoolDto> for Pool {
    fn from(dto: PoolDto) -> Self {
        Self {
            id: PoolId::new(dto.id),
            name: dto.name,
            description: dto.description,
            health: dto
                .status
                .as_deref()
                .map_or(PoolHealth::Unknown, PoolHealth::parse),
            pressure: dto.pressure,
            pool_type: dto.pool_type,
            enabled: dto.enabled.unwrap_or(true),
            created_at: parse_datetime(dto.create_time.as_ref()),
            updated_at: parse_datetime(dto.update_time.as_ref()),
        }
    }
}

// ── PoolStatus ──────────────────────────────────────────────────────

impl From<PoolStatusDto> for PoolStatus {
    fn from(dto: PoolStatusDto) -> Self {
        let valid = dto.valid_count.unwrap_or(0);
        let invalid = dto.invalid_count.unwrap_or(0);
        let cooling = dto.cooling_count.unwrap_or(0);
        Self {
            pool_id: PoolId::new(dto.pool_id),
            pool_name: dto.pool_name,
            valid_count: valid,
            invalid_count: invalid,
            cooling_count: cooling,
            total_count: dto.total_count.unwrap_or(valid + invalid + cooling),
            pressure: dto.pressure,
            last_updated: epoch_ms_to_datetime(dto.record_time),
        }
    }
}

// ── VirtualPool ─────────────────────────────────────────────────────

impl From<VirtualPoolDto> for VirtualPool {
    fn from(dto: VirtualPoolDto) -> Self {
        Self {
            id: PoolId::new(dto.id),
            name: dto.name,
            description: dto.description,
            pool_ids: dto.pool_ids.into_iter().map(PoolId::new).collect(),
            strategy: dto
                .strategy
                .as_deref()
                .map_or_else(SelectionStrategy::default, SelectionStrategy::parse),
            enabled: dto.enabled.unwrap_or(true),
            created_at: parse_datetime(dto.create_time.as_ref()),
            updated_at: parse_datetime(dto.update_time.as_ref()),
        }
    }
}

// ── OverviewStats ───────────────────────────────────────────────────

impl From<OverviewStatsDto> for OverviewStats {
    fn from(dto: OverviewStatsDto) -> Self {
        Self {
            total_pools: dto.total_pools.unwrap_or(0),
            active_pools: dto.active_pools.unwrap_or(0),
            total_valid_count: dto.total_valid_count.unwrap_or(0),
            total_invalid_count: dto.total_invalid_count.unwrap_or(0),
            total_cooling_count: dto.total_cooling_count.unwrap_or(0),
            total_count: dto.total_count.unwrap_or(0),
            avg_pressure: dto.avg_pressure,
        }
    }
}

// ── DataSourceType ──────────────────────────────────────────────────

impl From<DataSourceTypeDto> for DataSourceType {
    fn from(dto: DataSourceTypeDto) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            class_full_name: dto.class_full_name,
        }
    }
}
