//! Reactive data layer between `poolwatch-api` and UI consumers.
//!
//! This crate owns the business logic, domain model, and reactive data
//! infrastructure for the poolwatch workspace:
//!
//! - **[`SessionManager`]** — Authentication lifecycle: login, logout,
//!   token refresh, startup restore from a [`SessionStore`], and
//!   teardown when the backend rejects the session.
//!
//! - **[`DirectoryStore`]** — Server-paginated pool listing, per-pool
//!   status cache, and virtual pool CRUD for the admin views. Each
//!   operation category carries independent loading/error flags.
//!
//! - **[`DashboardStore`]** — Public dashboard view: pool list joined
//!   with statuses, overview totals, trend charts per
//!   [`TimeRange`](model::TimeRange), and a cancellable auto-refresh
//!   task. Per-pool detail fetches are protected by a stale-response guard.
//!
//! - **Domain model** ([`model`]) — Canonical types (`Pool`,
//!   `PoolStatus`, `VirtualPool`, `OverviewStats`, `ChartSeries`) with
//!   [`PoolId`](model::PoolId) keeping 64-bit backend identifiers as
//!   strings.
//!
//! Consumers subscribe to `tokio::sync::watch` channels for reactive
//! rendering; every snapshot getter has a matching `subscribe_*`.

pub mod chart;
pub mod convert;
pub mod error;
pub mod model;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use session::{
    Credentials, MemorySessionStore, PersistedSession, SessionManager, SessionStore, UserInfo,
};
pub use store::{DashboardOp, DashboardStore, DirectoryOp, DirectoryStore, PageQuery};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ChartSeries, DataSourceType, OverviewStats, Pagination, Pool, PoolHealth, PoolId, PoolStatus,
    PoolWithStatus, SelectionStrategy, TimeRange, VirtualPool,
};
