// ── Canonical domain model ──

pub mod pool;
pub mod supporting;
pub mod virtual_pool;

pub use pool::{Pool, PoolHealth, PoolId, PoolStatus};
pub use supporting::{
    ChartSeries, DataSourceType, OverviewStats, Pagination, PoolWithStatus, TimeRange,
};
pub use virtual_pool::{SelectionStrategy, VirtualPool};
