// ── Virtual pool domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::pool::PoolId;

/// How a virtual pool picks among its member pools.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[non_exhaustive]
pub enum SelectionStrategy {
    #[default]
    RoundRobin,
    Priority,
    Weighted,
}

impl SelectionStrategy {
    /// Parse a backend strategy string, falling back to the default.
    pub fn parse(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

/// An aggregate over concrete pools.
///
/// `pool_ids` are weak references into the pool directory: a member may
/// have been deleted since the virtual pool was saved, and resolution
/// skips such ids rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualPool {
    pub id: PoolId,
    pub name: String,
    pub description: Option<String>,
    pub pool_ids: Vec<PoolId>,
    pub strategy: SelectionStrategy,
    pub enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parse_uses_wire_tokens() {
        assert_eq!(
            SelectionStrategy::parse("round_robin"),
            SelectionStrategy::RoundRobin
        );
        assert_eq!(
            SelectionStrategy::parse("priority"),
            SelectionStrategy::Priority
        );
        assert_eq!(
            SelectionStrategy::parse("weighted"),
            SelectionStrategy::Weighted
        );
    }

    #[test]
    fn unknown_strategy_falls_back_to_round_robin() {
        assert_eq!(
            SelectionStrategy::parse("magic"),
            SelectionStrategy::RoundRobin
        );
    }
}
